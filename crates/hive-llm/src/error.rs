//! Errors an agent's model provider can raise

use std::time::Duration;
use thiserror::Error;

/// Provider error
#[derive(Debug, Error)]
pub enum Error {
    /// No usable provider for an agent (unknown name, missing key)
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// The provider answered with an error status
    #[error("{provider} rejected the request ({status}): {message}")]
    Rejected {
        /// Provider name
        provider: String,
        /// HTTP status
        status: u16,
        /// Sanitized provider message
        message: String,
    },

    /// The provider is throttling this agent
    #[error("{provider} is rate limiting requests")]
    RateLimited {
        /// Provider name
        provider: String,
    },

    /// The reply body could not be read as a completion
    #[error("unreadable reply from {provider}: {message}")]
    Malformed {
        /// Provider name
        provider: String,
        /// Decoder message
        message: String,
    },

    /// The request never reached the provider
    #[error("network error: {0}")]
    Network(String),

    /// No reply within the request timeout
    #[error("no reply within {0:?}")]
    Timeout(Duration),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
