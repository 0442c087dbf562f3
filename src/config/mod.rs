//! Settings and agent definitions
//!
//! - `settings.toml` holds team-wide settings (`Settings`)
//! - `agents/<name>/agent.toml` + `soul.md` define one agent each
//!   (`AgentDefinition`)

mod agent;
mod loader;

pub use agent::{AgentDefinition, AgentFile, DiscordLogin, ToolEntry, AGENT_FILE};
pub use loader::{load_agents, load_settings, AGENTS_DIR, SCHEDULES_FILE, SETTINGS_FILE};

use hive_channels::DiscordConfig;
use hive_core::{LlmOverride, OrchestratorConfig};
use hive_llm::ProviderSelection;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "HIVE_CONFIG_DIR";

/// Team-wide API key variable, checked before the provider's own
pub const API_KEY_ENV: &str = "HIVE_LLM_API_KEY";

/// `$HIVE_CONFIG_DIR`, else `<platform config dir>/hive`, else `./.hive`
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|d| d.join("hive"))
        .unwrap_or_else(|| PathBuf::from(".hive"))
}

/// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub default_llm: LlmSettings,
    #[serde(default)]
    pub orchestrator: OrchestratorSettings,
    #[serde(default)]
    pub tools: ToolSettings,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

/// Default LLM for agents without an override
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl LlmSettings {
    /// Provider selection for `choice` (an agent override) or the default.
    ///
    /// The configured key only applies to the default provider; otherwise
    /// the key comes from `HIVE_LLM_API_KEY` or the provider's own variable.
    #[must_use]
    pub fn selection(&self, choice: Option<&LlmOverride>, timeout: Duration) -> ProviderSelection {
        let (provider, model, configured) = match choice {
            Some(c) if !c.provider.eq_ignore_ascii_case(&self.provider) => {
                (c.provider.clone(), c.model.clone(), None)
            }
            Some(c) => (c.provider.clone(), c.model.clone(), self.api_key.clone()),
            None => (self.provider.clone(), self.model.clone(), self.api_key.clone()),
        };
        let api_key = configured
            .filter(|k| !k.is_empty())
            .or_else(|| env_key(API_KEY_ENV))
            .or_else(|| provider_key_var(&provider).and_then(env_key));
        let base_url = if choice.is_none_or(|c| c.provider.eq_ignore_ascii_case(&self.provider)) {
            self.base_url.clone().filter(|u| !u.is_empty())
        } else {
            None
        };

        ProviderSelection {
            provider,
            model,
            api_key,
            base_url,
            timeout: Some(timeout),
        }
    }
}

fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// The provider's own API key variable
#[must_use]
pub fn provider_key_var(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "openai" => Some("OPENAI_API_KEY"),
        "groq" => Some("GROQ_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        _ => None,
    }
}

/// Orchestrator configuration (exposed to TOML)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    pub step_budget: usize,
    pub context_window: usize,
    pub relevance_timeout_secs: u64,
    pub completion_timeout_secs: u64,
    pub mentions_are_exclusive: bool,
    pub tool_results_trigger: bool,
    pub inbound_buffer: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        let defaults = OrchestratorConfig::default();
        Self {
            step_budget: defaults.step_budget,
            context_window: defaults.context_window,
            relevance_timeout_secs: defaults.relevance_timeout.as_secs(),
            completion_timeout_secs: defaults.completion_timeout.as_secs(),
            mentions_are_exclusive: defaults.mentions_are_exclusive,
            tool_results_trigger: defaults.tool_results_trigger,
            inbound_buffer: defaults.inbound_buffer,
        }
    }
}

impl OrchestratorSettings {
    /// Core configuration
    #[must_use]
    pub fn to_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            step_budget: self.step_budget,
            context_window: self.context_window.max(1),
            relevance_timeout: Duration::from_secs(self.relevance_timeout_secs.max(1)),
            completion_timeout: Duration::from_secs(self.completion_timeout_secs.max(1)),
            mentions_are_exclusive: self.mentions_are_exclusive,
            tool_results_trigger: self.tool_results_trigger,
            inbound_buffer: self.inbound_buffer.max(1),
            ..OrchestratorConfig::default()
        }
    }
}

/// Tool bridge settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub timeout_secs: u64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            timeout_secs: hive_tools::bridge::DEFAULT_TOOL_TIMEOUT.as_secs(),
        }
    }
}

/// Scheduler runner settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub enabled: bool,
    pub tick_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(provider: &str, key: Option<&str>) -> LlmSettings {
        LlmSettings {
            provider: provider.to_string(),
            model: "base-model".to_string(),
            api_key: key.map(str::to_string),
            base_url: Some("http://localhost:1234/v1".to_string()),
        }
    }

    #[test]
    fn test_default_selection_uses_configured_key() {
        let selection = llm("groq", Some("gsk-configured")).selection(None, Duration::from_secs(5));
        assert_eq!(selection.provider, "groq");
        assert_eq!(selection.model, "base-model");
        assert_eq!(selection.api_key.as_deref(), Some("gsk-configured"));
        assert_eq!(selection.base_url.as_deref(), Some("http://localhost:1234/v1"));
        assert_eq!(selection.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_override_of_other_provider_drops_default_key_and_url() {
        let choice = LlmOverride {
            provider: "ollama".to_string(),
            model: "llama3".to_string(),
        };
        let selection = llm("groq", Some("gsk-configured")).selection(Some(&choice), Duration::from_secs(5));
        assert_eq!(selection.provider, "ollama");
        assert_eq!(selection.model, "llama3");
        assert_ne!(selection.api_key.as_deref(), Some("gsk-configured"));
        assert!(selection.base_url.is_none());
    }

    #[test]
    fn test_provider_key_vars() {
        assert_eq!(provider_key_var("OpenAI"), Some("OPENAI_API_KEY"));
        assert_eq!(provider_key_var("ollama"), None);
    }

    #[test]
    fn test_orchestrator_settings_clamped() {
        let settings = OrchestratorSettings {
            context_window: 0,
            relevance_timeout_secs: 0,
            ..OrchestratorSettings::default()
        };
        let config = settings.to_config();
        assert_eq!(config.context_window, 1);
        assert_eq!(config.relevance_timeout, Duration::from_secs(1));
        assert_eq!(config.step_budget, 6);
    }
}
