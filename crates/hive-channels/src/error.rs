//! Error types for hive-channels

use thiserror::Error;

/// Channel error type
#[derive(Debug, Error)]
pub enum Error {
    /// Discord error
    #[error("discord error: {0}")]
    Discord(String),

    /// Message or id parsing error
    #[error("message parsing error: {0}")]
    Parse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for hive_core::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Network(msg) => hive_core::Error::ChannelClosed(msg),
            other => hive_core::Error::Internal(other.to_string()),
        }
    }
}
