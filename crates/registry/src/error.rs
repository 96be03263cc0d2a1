use thiserror::Error;

use crate::types::{ChannelId, UserId};

/// Crate-wide result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed registry errors.
///
/// Every operation is synchronous and in-memory; these are the only failure
/// modes, returned as explicit values and never swallowed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The user already owns an active room.
    #[error("user {owner} already owns channel {channel}")]
    AlreadyOwned { owner: UserId, channel: ChannelId },

    /// The channel id is already registered to another record.
    #[error("channel {channel} is already registered")]
    ChannelExists { channel: ChannelId },

    /// The user does not currently own the named channel.
    #[error("user {owner} does not own channel {channel}")]
    NotOwned { owner: UserId, channel: ChannelId },

    /// No record exists for the channel id.
    #[error("channel {channel} is not registered")]
    UnknownChannel { channel: ChannelId },
}
