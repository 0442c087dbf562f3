//! Error types for hive-core
//!
//! Only infrastructure failures are errors here. Failures inside an agent's
//! turn (parse warnings, denials, bridge and provider failures) are data that
//! ends up in the shared transcript.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] hive_llm::Error),

    /// Tool setup error
    #[error("tool error: {0}")]
    Tool(#[from] hive_tools::Error),

    /// Configuration error (roster, permissions, settings)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The inbound or outbound channel is gone
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// An agent name that is not on the roster
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::Llm(hive_llm::Error::NotConfigured(msg)) => {
                format!("🔑 LLM provider is not configured: {}", msg)
            }
            Error::Llm(hive_llm::Error::RateLimited { .. }) => {
                "⏳ Rate limit exceeded. Please try again later.".to_string()
            }
            Error::Llm(e) => format!("🤖 LLM error: {}", e),
            Error::Tool(e) => format!("🔧 Tool error: {}", e),
            Error::Configuration(msg) => format!("⚙️ Configuration error: {}", msg),
            Error::ChannelClosed(what) => format!("📪 Channel closed: {}", what),
            Error::UnknownAgent(name) => format!("🐝 No agent named '{}' in this hive.", name),
            Error::Internal(msg) => format!("❌ Internal error: {}", msg),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::Llm(hive_llm::Error::NotConfigured(_)) => Some(
                "💡 Run `hive init` or set the HIVE_LLM_API_KEY environment variable.".to_string(),
            ),
            Error::Llm(hive_llm::Error::RateLimited { .. }) => {
                Some("💡 Try a different model or wait before retrying.".to_string())
            }
            Error::Configuration(_) => Some(
                "💡 Check settings.toml and the agents/ directory under your hive config dir."
                    .to_string(),
            ),
            Error::UnknownAgent(_) => Some("💡 Run `hive list` to see configured agents.".to_string()),
            Error::Tool(_) => Some("💡 Run `hive tools` to review tool endpoints.".to_string()),
            _ => None,
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = error.user_message();
    output.push('\n');

    if let Some(suggestion) = error.suggestion() {
        output.push('\n');
        output.push_str(&suggestion);
        output.push('\n');
    }

    output
}
