//! One completion round trip: what an agent asks and what comes back

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Tokens billed for one completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt side
    pub input_tokens: u32,
    /// Generated side
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Both sides together
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Why generation stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model finished its answer
    Finished,
    /// `max_tokens` cut the answer short
    LengthLimit,
    /// Anything else the provider reported
    Other(String),
}

impl StopReason {
    /// Map a provider's finish/stop reason
    #[must_use]
    pub fn from_provider(reason: Option<&str>) -> Self {
        match reason {
            None | Some("stop") | Some("end_turn") | Some("stop_sequence") => Self::Finished,
            Some("length") | Some("max_tokens") => Self::LengthLimit,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

/// What an agent asks a provider for
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model to use (empty means the provider default)
    pub model: String,
    /// Persona prompt first, then the rendered context window
    pub messages: Vec<Message>,
    /// Output cap; relevance checks use a handful of tokens
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Request against `model`
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Add messages
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Cap the output
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// What came back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text
    pub content: String,
    /// Model that answered
    pub model: String,
    /// Billing, when the provider reports it
    pub usage: Option<TokenUsage>,
    /// Why generation stopped
    pub stop: StopReason,
}

impl CompletionResponse {
    /// Finished text reply with no usage data
    #[must_use]
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: None,
            stop: StopReason::Finished,
        }
    }

    /// Whether the output cap cut the reply short
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.stop == StopReason::LengthLimit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(StopReason::from_provider(Some("end_turn")), StopReason::Finished);
        assert_eq!(StopReason::from_provider(None), StopReason::Finished);
        assert_eq!(StopReason::from_provider(Some("max_tokens")), StopReason::LengthLimit);
        assert_eq!(StopReason::from_provider(Some("length")), StopReason::LengthLimit);
        assert_eq!(
            StopReason::from_provider(Some("content_filter")),
            StopReason::Other("content_filter".to_string())
        );
    }

    #[test]
    fn test_usage_total() {
        let usage = TokenUsage {
            input_tokens: 120,
            output_tokens: 3,
        };
        assert_eq!(usage.total(), 123);
    }
}
