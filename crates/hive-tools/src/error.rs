//! Error types for hive-tools

use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid tool configuration (registry, endpoints)
    #[error("tool configuration error: {0}")]
    Config(String),

    /// Scheduling failed
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Reading or writing the schedule file failed
    #[error("schedule file {path}: {message}")]
    Storage {
        /// File involved
        path: String,
        /// What went wrong
        message: String,
    },

    /// Network client setup failed
    #[error("network error: {0}")]
    Network(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
