//! The `VoiceGateway` trait and its request/response types.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use tempvox_registry::{ChannelId, GuildId, UserId};

use crate::error::Result;

/// Platform role identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RoleId(pub u64);

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Target of a permission edit: a single member, a role, or everyone in the
/// guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Principal {
    Member(UserId),
    Role(RoleId),
    Everyone,
}

/// Request to provision a voice room.
///
/// Implementations apply the standard overwrites: connect for everyone,
/// connect + manage for the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoom {
    pub guild: GuildId,
    /// Category to place the room under; `None` means top level.
    pub category: Option<ChannelId>,
    pub name: String,
    pub owner: UserId,
}

/// Result of probing a room at the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelProbe {
    pub exists: bool,
    pub member_count: usize,
}

impl ChannelProbe {
    /// Probe result for a channel the platform no longer knows about.
    pub const GONE: Self = Self {
        exists: false,
        member_count: 0,
    };

    #[must_use]
    pub fn occupied(member_count: usize) -> Self {
        Self {
            exists: true,
            member_count,
        }
    }

    /// Exists but has nobody connected.
    pub fn is_empty(&self) -> bool {
        self.exists && self.member_count == 0
    }
}

/// Outcome of the join-channel setup operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    /// The join channel (and category, if needed) was created.
    Created,
    /// Everything was already in place.
    AlreadyExists,
}

/// Operations the room logic needs from the chat platform.
///
/// All calls run to completion or failure; there is no cancellation or retry
/// at this seam. Divergence between the registry and the platform after a
/// failed call is reconciled by the next reaper pass.
#[async_trait]
pub trait VoiceGateway: Send + Sync {
    /// Create a voice room and return the platform-assigned channel id.
    async fn create_voice_channel(&self, req: CreateRoom) -> Result<ChannelId>;

    /// Delete a channel, with a reason string for the platform audit log.
    async fn delete_channel(&self, channel: ChannelId, reason: &str) -> Result<()>;

    /// Allow or deny the connect permission for a principal on a room.
    async fn set_connect(
        &self,
        guild: GuildId,
        channel: ChannelId,
        principal: Principal,
        allow: bool,
    ) -> Result<()>;

    /// Grant or revoke the room-management permission for a member.
    async fn set_manage(&self, channel: ChannelId, user: UserId, allow: bool) -> Result<()>;

    /// Move a connected member into a voice room.
    async fn move_member(&self, guild: GuildId, user: UserId, channel: ChannelId) -> Result<()>;

    /// Rename a room.
    async fn rename_channel(&self, channel: ChannelId, name: &str) -> Result<()>;

    /// Report whether a room still exists and how many members occupy it.
    /// A missing room is [`ChannelProbe::GONE`], not an error.
    async fn probe(&self, guild: GuildId, channel: ChannelId) -> Result<ChannelProbe>;

    /// Bulk-delete up to `amount` recent messages in a text channel,
    /// returning how many were removed.
    async fn purge_messages(&self, channel: ChannelId, amount: u8) -> Result<usize>;

    /// Create the room category and the join channel inside it when missing.
    async fn ensure_join_channel(
        &self,
        guild: GuildId,
        category_name: &str,
        join_name: &str,
    ) -> Result<SetupOutcome>;
}
