//! Single source of truth for which room belongs to which user and when it
//! should be auto-removed.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use {
    chrono::{DateTime, Utc},
    tracing::debug,
};

use crate::{
    error::{Error, Result},
    types::{ChannelId, GuildId, TempChannel, UserId},
};

/// Registry behind a process-wide lock.
///
/// All registry methods are synchronous map operations, so the lock is a
/// `std::sync::RwLock` and must never be held across an `.await` point.
pub type SharedRegistry = Arc<RwLock<TempChannelRegistry>>;

/// In-memory index of provisioned rooms.
///
/// Two mappings: owner → channel and channel → record. Invariants upheld by
/// every mutation: at most one record per channel id, at most one active
/// record per owner.
#[derive(Debug, Default)]
pub struct TempChannelRegistry {
    by_owner: HashMap<UserId, ChannelId>,
    by_channel: HashMap<ChannelId, TempChannel>,
}

impl TempChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// New empty registry behind a shared lock.
    pub fn shared() -> SharedRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Register a new room with no expiry.
    ///
    /// Never overwrites: a second room for the same owner is rejected with
    /// [`Error::AlreadyOwned`], and re-registering a live channel id with
    /// [`Error::ChannelExists`]. Callers that want replace-with-cleanup must
    /// `remove` first.
    pub fn create(&mut self, owner: UserId, guild: GuildId, channel: ChannelId) -> Result<TempChannel> {
        if let Some(existing) = self.by_owner.get(&owner) {
            return Err(Error::AlreadyOwned {
                owner,
                channel: *existing,
            });
        }
        if self.by_channel.contains_key(&channel) {
            return Err(Error::ChannelExists { channel });
        }

        let record = TempChannel {
            channel_id: channel,
            guild_id: guild,
            owner_id: owner,
            expires_at: None,
        };
        self.by_owner.insert(owner, channel);
        self.by_channel.insert(channel, record.clone());
        debug!(%owner, %channel, "room registered");
        Ok(record)
    }

    /// The room currently owned by `owner`, if any.
    pub fn lookup_by_owner(&self, owner: UserId) -> Option<&TempChannel> {
        self.by_owner
            .get(&owner)
            .and_then(|channel| self.by_channel.get(channel))
    }

    /// The record for `channel`, if registered.
    pub fn lookup_channel(&self, channel: ChannelId) -> Option<&TempChannel> {
        self.by_channel.get(&channel)
    }

    pub fn len(&self) -> usize {
        self.by_channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_channel.is_empty()
    }

    /// Snapshot of all registered records.
    pub fn records(&self) -> Vec<TempChannel> {
        self.by_channel.values().cloned().collect()
    }

    /// Overwrite any prior deadline for the room.
    ///
    /// Accepts any timestamp; bounds on user-supplied minute counts are the
    /// dispatcher's concern.
    pub fn set_expiry(&mut self, channel: ChannelId, when: DateTime<Utc>) -> Result<()> {
        let record = self
            .by_channel
            .get_mut(&channel)
            .ok_or(Error::UnknownChannel { channel })?;
        record.expires_at = Some(when);
        debug!(%channel, expires_at = %when, "room expiry set");
        Ok(())
    }

    /// Drop a previously scheduled deadline.
    pub fn clear_expiry(&mut self, channel: ChannelId) -> Result<()> {
        let record = self
            .by_channel
            .get_mut(&channel)
            .ok_or(Error::UnknownChannel { channel })?;
        record.expires_at = None;
        Ok(())
    }

    /// Atomically move the owner index entry from `old_owner` to `new_owner`
    /// and rewrite the record's owner.
    ///
    /// Fails with [`Error::NotOwned`] if `old_owner` does not currently own
    /// `channel`, and with [`Error::AlreadyOwned`] if `new_owner` already has
    /// a different room.
    pub fn transfer_ownership(
        &mut self,
        channel: ChannelId,
        old_owner: UserId,
        new_owner: UserId,
    ) -> Result<()> {
        let record = self
            .by_channel
            .get(&channel)
            .ok_or(Error::UnknownChannel { channel })?;
        if record.owner_id != old_owner {
            return Err(Error::NotOwned {
                owner: old_owner,
                channel,
            });
        }
        if let Some(existing) = self.by_owner.get(&new_owner)
            && *existing != channel
        {
            return Err(Error::AlreadyOwned {
                owner: new_owner,
                channel: *existing,
            });
        }

        self.by_owner.remove(&old_owner);
        self.by_owner.insert(new_owner, channel);
        if let Some(record) = self.by_channel.get_mut(&channel) {
            record.owner_id = new_owner;
        }
        debug!(%channel, %old_owner, %new_owner, "room ownership transferred");
        Ok(())
    }

    /// Remove a single room. Idempotent: removing an absent id is a no-op
    /// returning `None`, so a reaper tick and a concurrent manual delete can
    /// race on the same channel safely.
    pub fn remove(&mut self, channel: ChannelId) -> Option<TempChannel> {
        let record = self.by_channel.remove(&channel)?;
        // Only drop the owner index entry if it still points at this room.
        if self.by_owner.get(&record.owner_id) == Some(&channel) {
            self.by_owner.remove(&record.owner_id);
        }
        debug!(%channel, owner = %record.owner_id, "room deregistered");
        Some(record)
    }

    /// The maintenance pass: remove every room that is gone at the platform,
    /// currently empty, or past its deadline.
    ///
    /// `is_empty` and `is_gone` are the caller's probe results and `now` is
    /// the caller's clock, so the pass is pure with respect to its inputs.
    /// Returns the removal set so the caller can issue platform deletes and
    /// audit lines. Running it twice with unchanged inputs removes nothing
    /// the second time.
    pub fn reap(
        &mut self,
        now: DateTime<Utc>,
        mut is_empty: impl FnMut(ChannelId) -> bool,
        mut is_gone: impl FnMut(ChannelId) -> bool,
    ) -> Vec<ChannelId> {
        let due: Vec<ChannelId> = self
            .by_channel
            .values()
            .filter(|record| {
                is_gone(record.channel_id)
                    || is_empty(record.channel_id)
                    || record.expired(now)
            })
            .map(|record| record.channel_id)
            .collect();

        for channel in &due {
            self.remove(*channel);
        }
        due
    }
}
