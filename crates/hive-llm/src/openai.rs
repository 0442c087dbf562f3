//! OpenAI-compatible chat completions provider
//!
//! OpenAI, Groq and Ollama all expose the same `/chat/completions` shape, so a
//! single provider serves all three; only the base URL, default model and key
//! requirement differ.

use crate::completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
use crate::error::{Error, Result};
use crate::message::Message;
use crate::provider::LlmProvider;
use crate::util::{mask_api_key, sanitize_api_error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI API base URL
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
/// Groq API base URL
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
/// Ollama local API base URL
pub const OLLAMA_API_BASE: &str = "http://localhost:11434/v1";

/// Default OpenAI model
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default Groq model
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
/// Default Ollama model
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3.2";

/// OpenAI-compatible provider configuration
#[derive(Clone)]
pub struct OpenAiCompatConfig {
    /// Provider name reported by [`LlmProvider::name`]
    pub name: String,
    /// API key (may be empty for local servers)
    pub api_key: String,
    /// Base URL up to and including the API version segment
    pub base_url: String,
    /// Default model
    pub default_model: String,
    /// Request timeout
    pub timeout: Duration,
}

// SECURITY: Custom Debug implementation to mask API key
impl fmt::Debug for OpenAiCompatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatConfig")
            .field("name", &self.name)
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiCompatConfig {
    /// OpenAI preset
    #[must_use]
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            name: "openai".to_string(),
            api_key: api_key.into(),
            base_url: OPENAI_API_BASE.to_string(),
            default_model: OPENAI_DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Groq preset
    #[must_use]
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            name: "groq".to_string(),
            api_key: api_key.into(),
            base_url: GROQ_API_BASE.to_string(),
            default_model: GROQ_DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Ollama preset (no key)
    #[must_use]
    pub fn ollama() -> Self {
        Self {
            name: "ollama".to_string(),
            api_key: String::new(),
            base_url: OLLAMA_API_BASE.to_string(),
            default_model: OLLAMA_DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
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

    /// Set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// OpenAI-compatible provider
pub struct OpenAiCompatProvider {
    config: OpenAiCompatConfig,
    client: Client,
}

impl OpenAiCompatProvider {
    /// Create a new provider
    pub fn new(config: OpenAiCompatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn convert_message(msg: &Message) -> ChatMessage {
        ChatMessage {
            role: msg.role.as_str(),
            content: msg.content.clone(),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(provider = %self.config.name, model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = if request.model.is_empty() {
            &self.config.default_model
        } else {
            &request.model
        };

        let chat_request = ChatRequest {
            model: model.to_string(),
            messages: request.messages.iter().map(Self::convert_message).collect(),
            max_tokens: request.max_tokens,
        };

        debug!("Sending request to {}", self.config.name);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Content-Type", "application/json")
            .json(&chat_request);
        if !self.config.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.config.api_key));
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(self.config.timeout)
            } else {
                Error::Network(sanitize_api_error(&e.to_string()))
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(Error::RateLimited {
                provider: self.config.name.clone(),
            });
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Rejected {
                provider: self.config.name.clone(),
                status: status.as_u16(),
                message: sanitize_api_error(&error_text),
            });
        }

        let malformed = |message: String| Error::Malformed {
            provider: self.config.name.clone(),
            message,
        };
        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| malformed(e.to_string()))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| malformed("no choices in response".to_string()))?;

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            model: chat_response.model,
            usage: chat_response.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
            stop: StopReason::from_provider(choice.finish_reason.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let groq = OpenAiCompatConfig::groq("gsk_test_key_123");
        assert_eq!(groq.base_url, GROQ_API_BASE);
        assert_eq!(groq.default_model, GROQ_DEFAULT_MODEL);

        let ollama = OpenAiCompatConfig::ollama();
        assert!(ollama.api_key.is_empty());
        assert_eq!(ollama.name, "ollama");
    }

    #[test]
    fn test_config_builder() {
        let config = OpenAiCompatConfig::openai("sk-test")
            .with_base_url("http://localhost:8080/v1/")
            .with_model("gpt-4o")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_debug_masks_key() {
        let config = OpenAiCompatConfig::openai("sk-1234567890abcdef");
        let debug = format!("{:?}", config);
        assert!(debug.contains("sk-1...cdef"));
        assert!(!debug.contains("1234567890"));
    }

    #[test]
    fn test_message_conversion() {
        let converted = OpenAiCompatProvider::convert_message(&Message::system("rules"));
        assert_eq!(converted.role, "system");
        assert_eq!(converted.content, "rules");
    }
}
