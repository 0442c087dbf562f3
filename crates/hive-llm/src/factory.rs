//! Provider construction from configuration values

use crate::anthropic::{AnthropicConfig, AnthropicProvider};
use crate::error::{Error, Result};
use crate::openai::{OpenAiCompatConfig, OpenAiCompatProvider};
use crate::provider::LlmProvider;
use std::sync::Arc;
use std::time::Duration;

/// Which provider and model an agent (or the team default) uses.
#[derive(Debug, Clone, Default)]
pub struct ProviderSelection {
    /// Provider name: `openai`, `groq`, `anthropic` or `ollama`
    pub provider: String,
    /// Model override (empty for the provider default)
    pub model: String,
    /// API key
    pub api_key: Option<String>,
    /// Base URL override
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Option<Duration>,
}

/// Build a provider for a selection.
pub fn provider_from_selection(selection: &ProviderSelection) -> Result<Arc<dyn LlmProvider>> {
    let provider = selection.provider.trim().to_lowercase();
    let key = || {
        selection
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::NotConfigured(format!("no API key for provider '{}'", provider)))
    };

    let built: Arc<dyn LlmProvider> = match provider.as_str() {
        "openai" | "groq" | "ollama" => {
            let mut config = match provider.as_str() {
                "openai" => OpenAiCompatConfig::openai(key()?),
                "groq" => OpenAiCompatConfig::groq(key()?),
                _ => OpenAiCompatConfig::ollama(),
            };
            if !selection.model.is_empty() {
                config = config.with_model(&selection.model);
            }
            if let Some(url) = &selection.base_url {
                config = config.with_base_url(url);
            }
            if let Some(timeout) = selection.timeout {
                config = config.with_timeout(timeout);
            }
            Arc::new(OpenAiCompatProvider::new(config)?)
        }
        "anthropic" => {
            let mut config = AnthropicConfig::new(key()?);
            if !selection.model.is_empty() {
                config = config.with_model(&selection.model);
            }
            if let Some(url) = &selection.base_url {
                config = config.with_base_url(url);
            }
            if let Some(timeout) = selection.timeout {
                config = config.with_timeout(timeout);
            }
            Arc::new(AnthropicProvider::new(config)?)
        }
        other => {
            return Err(Error::NotConfigured(format!(
                "unknown provider '{}' (expected openai, groq, anthropic or ollama)",
                other
            )))
        }
    };

    Ok(built)
}
