//! `VoiceGateway` backed by serenity's HTTP client and cache.
//!
//! HTTP calls go out through [`Http`]; existence and occupancy checks read
//! the gateway cache, which serenity keeps current from voice-state events.

use std::sync::Arc;

use {
    async_trait::async_trait,
    serenity::all::{
        Cache, ChannelType, CreateChannel, EditChannel, EditMember, GetMessages, Http,
        PermissionOverwrite, PermissionOverwriteType, Permissions,
    },
    tracing::debug,
};

use {
    tempvox_platform::{
        ChannelProbe, CreateRoom, Error, Principal, Result, SetupOutcome, VoiceGateway,
    },
    tempvox_registry::{ChannelId, GuildId, UserId},
};

/// Gateway implementation over the live Discord connection.
pub struct SerenityGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }
}

// Conversions between the platform-neutral newtypes and serenity's ids.

fn guild(id: GuildId) -> serenity::all::GuildId {
    serenity::all::GuildId::new(id.0)
}

fn channel(id: ChannelId) -> serenity::all::ChannelId {
    serenity::all::ChannelId::new(id.0)
}

fn user(id: UserId) -> serenity::all::UserId {
    serenity::all::UserId::new(id.0)
}

/// The @everyone role shares the guild's id.
fn everyone_role(id: GuildId) -> serenity::all::RoleId {
    serenity::all::RoleId::new(id.0)
}

fn overwrite_kind(g: GuildId, principal: Principal) -> PermissionOverwriteType {
    match principal {
        Principal::Member(u) => PermissionOverwriteType::Member(user(u)),
        Principal::Role(r) => PermissionOverwriteType::Role(serenity::all::RoleId::new(r.0)),
        Principal::Everyone => PermissionOverwriteType::Role(everyone_role(g)),
    }
}

#[async_trait]
impl VoiceGateway for SerenityGateway {
    async fn create_voice_channel(&self, req: CreateRoom) -> Result<ChannelId> {
        let CreateRoom {
            guild: g,
            category,
            name,
            owner,
        } = req;

        let overwrites = vec![
            PermissionOverwrite {
                allow: Permissions::CONNECT,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Role(everyone_role(g)),
            },
            PermissionOverwrite {
                allow: Permissions::CONNECT | Permissions::MANAGE_CHANNELS,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(user(owner)),
            },
        ];

        let mut builder = CreateChannel::new(name)
            .kind(ChannelType::Voice)
            .permissions(overwrites);
        if let Some(parent) = category {
            builder = builder.category(channel(parent));
        }

        let created = guild(g)
            .create_channel(&self.http, builder)
            .await
            .map_err(|e| Error::external("create voice channel", e))?;
        debug!(channel = %created.id, "created voice channel");
        Ok(ChannelId(created.id.get()))
    }

    async fn delete_channel(&self, ch: ChannelId, reason: &str) -> Result<()> {
        self.http
            .delete_channel(channel(ch), Some(reason))
            .await
            .map_err(|e| Error::external("delete channel", e))?;
        Ok(())
    }

    async fn set_connect(
        &self,
        g: GuildId,
        ch: ChannelId,
        principal: Principal,
        allow: bool,
    ) -> Result<()> {
        let (allow_set, deny_set) = if allow {
            (Permissions::CONNECT, Permissions::empty())
        } else {
            (Permissions::empty(), Permissions::CONNECT)
        };
        channel(ch)
            .create_permission(&self.http, PermissionOverwrite {
                allow: allow_set,
                deny: deny_set,
                kind: overwrite_kind(g, principal),
            })
            .await
            .map_err(|e| Error::external("set connect permission", e))
    }

    async fn set_manage(&self, ch: ChannelId, member: UserId, allow: bool) -> Result<()> {
        let (allow_set, deny_set) = if allow {
            (Permissions::MANAGE_CHANNELS, Permissions::empty())
        } else {
            (Permissions::empty(), Permissions::MANAGE_CHANNELS)
        };
        channel(ch)
            .create_permission(&self.http, PermissionOverwrite {
                allow: allow_set,
                deny: deny_set,
                kind: PermissionOverwriteType::Member(user(member)),
            })
            .await
            .map_err(|e| Error::external("set manage permission", e))
    }

    async fn move_member(&self, g: GuildId, member: UserId, ch: ChannelId) -> Result<()> {
        guild(g)
            .edit_member(
                &self.http,
                user(member),
                EditMember::new().voice_channel(channel(ch)),
            )
            .await
            .map_err(|e| Error::external("move member", e))?;
        Ok(())
    }

    async fn rename_channel(&self, ch: ChannelId, name: &str) -> Result<()> {
        channel(ch)
            .edit(&self.http, EditChannel::new().name(name))
            .await
            .map_err(|e| Error::external("rename channel", e))?;
        Ok(())
    }

    async fn probe(&self, g: GuildId, ch: ChannelId) -> Result<ChannelProbe> {
        let Some(guild_ref) = self.cache.guild(guild(g)) else {
            // Cache not primed yet; report unavailable rather than a false
            // "gone" that would evict a live room.
            return Err(Error::unavailable("guild not in cache"));
        };
        let channel_id = channel(ch);
        if !guild_ref.channels.contains_key(&channel_id) {
            return Ok(ChannelProbe::GONE);
        }
        let member_count = guild_ref
            .voice_states
            .values()
            .filter(|vs| vs.channel_id == Some(channel_id))
            .count();
        Ok(ChannelProbe::occupied(member_count))
    }

    async fn purge_messages(&self, ch: ChannelId, amount: u8) -> Result<usize> {
        let target = channel(ch);
        let messages = target
            .messages(&self.http, GetMessages::new().limit(amount))
            .await
            .map_err(|e| Error::external("fetch messages", e))?;
        let ids: Vec<_> = messages.iter().map(|m| m.id).collect();

        match ids.len() {
            0 => Ok(0),
            // The bulk-delete endpoint needs at least two messages.
            1 => {
                target
                    .delete_message(&self.http, ids[0])
                    .await
                    .map_err(|e| Error::external("delete message", e))?;
                Ok(1)
            },
            n => {
                target
                    .delete_messages(&self.http, ids)
                    .await
                    .map_err(|e| Error::external("bulk delete messages", e))?;
                Ok(n)
            },
        }
    }

    async fn ensure_join_channel(
        &self,
        g: GuildId,
        category_name: &str,
        join_name: &str,
    ) -> Result<SetupOutcome> {
        let (category, join_exists) = {
            let Some(guild_ref) = self.cache.guild(guild(g)) else {
                return Err(Error::unavailable("guild not in cache"));
            };
            let category = guild_ref
                .channels
                .values()
                .find(|c| c.kind == ChannelType::Category && c.name == category_name)
                .map(|c| c.id);
            let join_exists = category.is_some_and(|cat| {
                guild_ref.channels.values().any(|c| {
                    c.kind == ChannelType::Voice && c.parent_id == Some(cat) && c.name == join_name
                })
            });
            (category, join_exists)
        };

        if join_exists {
            return Ok(SetupOutcome::AlreadyExists);
        }

        let category_id = match category {
            Some(id) => id,
            None => {
                guild(g)
                    .create_channel(
                        &self.http,
                        CreateChannel::new(category_name).kind(ChannelType::Category),
                    )
                    .await
                    .map_err(|e| Error::external("create category", e))?
                    .id
            },
        };
        guild(g)
            .create_channel(
                &self.http,
                CreateChannel::new(join_name)
                    .kind(ChannelType::Voice)
                    .category(category_id),
            )
            .await
            .map_err(|e| Error::external("create join channel", e))?;
        Ok(SetupOutcome::Created)
    }
}
