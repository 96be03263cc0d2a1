//! The recognized command surface and its typed replies.

use {
    tempvox_platform::{Principal, SetupOutcome},
    tempvox_registry::{ChannelId, GuildId, UserId},
};

/// A room-management command, already parsed by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the join-to-create system in a guild.
    Setup { guild: GuildId },
    /// Deny connect for everyone on the actor's room.
    Lock,
    /// Allow a member or role to join the actor's room.
    Permit { target: Principal },
    /// Block a member or role from the actor's room.
    Reject { target: Principal },
    /// Rename the actor's room.
    Rename { name: String },
    /// Auto-delete the actor's room after the given number of minutes.
    Expire { minutes: i64 },
    /// Hand the actor's room to another member.
    Transfer { new_owner: UserId },
    /// Bulk-delete recent messages in the invoking text channel.
    Purge { channel: ChannelId, amount: i64 },
}

/// Successful command outcome, rendered into a user-visible reply by the
/// platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    SetupComplete(SetupOutcome),
    Locked,
    ConnectChanged { target: Principal, allow: bool },
    Renamed { name: String },
    ExpirySet { minutes: i64 },
    Transferred { new_owner: UserId },
    Purged { count: usize },
}
