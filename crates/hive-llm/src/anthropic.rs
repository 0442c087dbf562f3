//! Anthropic messages API
//!
//! The messages API takes the persona in a separate `system` field, wants
//! `user` and `assistant` turns to alternate and the first turn to be a
//! `user` one. A hive prompt satisfies none of that on its own (teammates
//! and humans speak in runs, and an agent's window may open on its own
//! entry), so [`AnthropicProvider::shape`] folds the prompt into that form.

use crate::completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
use crate::error::{Error, Result};
use crate::message::{coalesce, Message, MessageRole};
use crate::provider::LlmProvider;
use crate::util::{mask_api_key, sanitize_api_error};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "anthropic";

const API_VERSION: &str = "2023-06-01";

/// Model used when neither the agent nor the settings name one
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// The API rejects requests without an output cap
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Opens the conversation when the window starts on the agent's own entry
const WINDOW_OPENER: &str = "(earlier conversation omitted)";

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireTurn>,
}

#[derive(Debug, Serialize)]
struct WireTurn {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireReply {
    model: String,
    content: Vec<ReplyBlock>,
    stop_reason: Option<String>,
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReplyBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: WireErrorBody,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    r#type: String,
    message: String,
}

/// Anthropic provider configuration
#[derive(Clone)]
pub struct AnthropicConfig {
    /// API key
    pub api_key: String,
    /// Base URL without the `/v1` segment
    pub base_url: String,
    /// Model for requests that name none
    pub default_model: String,
    /// Output cap for requests that set none
    pub default_max_tokens: u32,
    /// Request timeout
    pub timeout: Duration,
}

// SECURITY: keep the key out of Debug output
impl fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AnthropicConfig {
    /// Configuration for `api_key` with the public endpoint
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(60),
        }
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set default model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set default max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    /// Set request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Claude as an agent's model
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Create a provider; no request is made until the first completion
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Split off the system text and fold the rest into alternating turns
    /// that open with `user`.
    fn shape(messages: &[Message]) -> (Option<String>, Vec<WireTurn>) {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect();

        let mut turns = coalesce(messages.iter().filter(|m| m.role != MessageRole::System));
        if turns.first().map_or(true, |m| m.role != MessageRole::User) {
            turns.insert(0, Message::user(WINDOW_OPENER));
        }

        let system = (!system.is_empty()).then(|| system.join("\n\n"));
        let turns = turns
            .into_iter()
            .map(|m| WireTurn {
                role: m.role.as_str(),
                content: m.content,
            })
            .collect();
        (system, turns)
    }

    /// Error for a non-success status and its body
    fn rejection(status: StatusCode, body: &str) -> Error {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Error::RateLimited {
                provider: PROVIDER.to_string(),
            };
        }
        let message = match serde_json::from_str::<WireError>(body) {
            Ok(wire) => format!("{}: {}", wire.error.r#type, wire.error.message),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
        };
        Error::Rejected {
            provider: PROVIDER.to_string(),
            status: status.as_u16(),
            message: sanitize_api_error(&message),
        }
    }

    fn into_response(reply: WireReply) -> CompletionResponse {
        let content: String = reply
            .content
            .into_iter()
            .filter_map(|block| match block {
                ReplyBlock::Text { text } => Some(text),
                ReplyBlock::Other => None,
            })
            .collect();

        CompletionResponse {
            content,
            model: reply.model,
            usage: Some(TokenUsage {
                input_tokens: reply.usage.input_tokens,
                output_tokens: reply.usage.output_tokens,
            }),
            stop: StopReason::from_provider(reply.stop_reason.as_deref()),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = if request.model.is_empty() {
            self.config.default_model.as_str()
        } else {
            request.model.as_str()
        };
        let (system, messages) = Self::shape(&request.messages);
        let wire = WireRequest {
            model,
            max_tokens: request.max_tokens.unwrap_or(self.config.default_max_tokens),
            system,
            messages,
        };

        let url = format!("{}/v1/messages", self.config.base_url);
        debug!(turns = wire.messages.len(), "Sending request to Anthropic");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&wire)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.config.timeout)
                } else {
                    Error::Network(sanitize_api_error(&e.to_string()))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(Self::rejection(status, &body));
        }

        let reply: WireReply = serde_json::from_str(&body).map_err(|e| Error::Malformed {
            provider: PROVIDER.to_string(),
            message: e.to_string(),
        })?;
        let response = Self::into_response(reply);
        if response.is_truncated() {
            warn!(model = %response.model, "Reply hit the output cap");
        }
        Ok(response)
    }
}
