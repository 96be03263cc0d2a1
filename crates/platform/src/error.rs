use std::error::Error as StdError;

/// Crate-wide result type for gateway calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed gateway errors shared across platform implementations.
///
/// Calls are asynchronous round-trips to an external service; failures are
/// not retried here, they propagate to the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input payload or parameter is invalid.
    #[error("invalid gateway input: {message}")]
    InvalidInput { message: String },

    /// Operation is currently unavailable (not connected/cache not ready).
    #[error("gateway unavailable: {message}")]
    Unavailable { message: String },

    /// Wrapped platform client error.
    #[error("gateway call failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
