use thiserror::Error;

/// Crate-wide result type for dispatched commands.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a command was refused.
///
/// Display strings are user-facing: the platform layer sends them back as
/// ephemeral replies verbatim. Underlying gateway causes stay on the source
/// chain for the logs.
#[derive(Debug, Error)]
pub enum Error {
    /// The acting user has no registered room.
    #[error("You don't own a temporary channel.")]
    NotOwned,

    /// A registry entry existed but the platform reports the channel absent.
    /// The stale entry has already been evicted.
    #[error("Channel not found.")]
    ChannelGone,

    /// The acting user already owns an active room.
    #[error("You already own a temporary channel.")]
    AlreadyOwned,

    /// The transfer target already owns a different room.
    #[error("That member already owns a temporary channel.")]
    TargetAlreadyOwns,

    /// A command argument is out of range or malformed.
    #[error("{0}")]
    InvalidArgument(String),

    /// The gateway call failed; nothing is retried.
    #[error("The request to the chat platform failed. Please try again.")]
    Gateway(#[from] tempvox_platform::Error),
}
