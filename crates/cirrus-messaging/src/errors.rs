//! Messaging error taxonomy.

use thiserror::Error;

use cirrus_rest::RestError;

/// Result type alias for messaging operations.
pub type MessagingResult<T> = Result<T, MessagingError>;

/// Errors that can occur during channel subscription operations.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The underlying REST call failed.
    #[error("{0}")]
    Rest(#[from] RestError),

    /// The subscribe request failed; the subscription is permanently dead
    /// and a new one must be constructed to retry.
    #[error("subscribe failed for channel {channel:?}: {message}")]
    Subscribe {
        /// Channel that was being subscribed.
        channel: String,
        /// What went wrong.
        message: String,
    },

    /// The subscription was cancelled before it became live.
    #[error("subscription cancelled")]
    Cancelled,
}

impl MessagingError {
    /// Whether this error is worth retrying (with a new subscription).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Rest(e) => e.is_retryable(),
            Self::Subscribe { .. } | Self::Cancelled => false,
        }
    }

    /// Error category string for logging.
    pub fn category(&self) -> &str {
        match self {
            Self::Rest(e) => e.category(),
            Self::Subscribe { .. } => "subscribe",
            Self::Cancelled => "cancelled",
        }
    }
}
