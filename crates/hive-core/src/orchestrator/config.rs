//! Orchestrator configuration
//!
//! Contains the configuration and input types for the orchestrator:
//! - `OrchestratorConfig` for run-loop settings
//! - `InboundEvent` for messages handed in by the chat platform

use crate::agent::AgentSettings;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// A chat message handed to the team, already stripped of platform types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Human user id (display name) or `scheduler`
    pub author_id: String,
    /// Message text
    pub content: String,
    /// Agents the platform reports as mentioned
    pub mentioned_agent_ids: Vec<String>,
    /// When the message was sent
    pub timestamp: DateTime<Utc>,
    /// Platform message id; repeated ids are ingested once
    pub external_id: Option<String>,
    /// Chat channel the message arrived in
    pub channel_id: Option<String>,
}

impl InboundEvent {
    /// Create an event timestamped now
    #[must_use]
    pub fn new(author_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author_id: author_id.into(),
            content: content.into(),
            mentioned_agent_ids: Vec::new(),
            timestamp: Utc::now(),
            external_id: None,
            channel_id: None,
        }
    }

    /// Set the mentioned agents
    #[must_use]
    pub fn with_mentions<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mentioned_agent_ids = agents.into_iter().map(Into::into).collect();
        self
    }

    /// Set the platform message id
    #[must_use]
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    /// Set the originating channel
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel_id = Some(channel.into());
        self
    }
}

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum agent turns per inbound event
    pub step_budget: usize,
    /// Entries of context given to each completion
    pub context_window: usize,
    /// Bound on each relevance call
    pub relevance_timeout: Duration,
    /// Bound on each completion
    pub completion_timeout: Duration,
    /// Mentions of other agents keep unmentioned agents silent
    pub mentions_are_exclusive: bool,
    /// Tool results are fanned out to the other agents like messages
    pub tool_results_trigger: bool,
    /// Capacity of the inbound channel
    pub inbound_buffer: usize,
    /// Platform message ids remembered for de-duplication
    pub dedup_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            step_budget: 6,
            context_window: 30,
            relevance_timeout: Duration::from_secs(20),
            completion_timeout: Duration::from_secs(90),
            mentions_are_exclusive: true,
            tool_results_trigger: true,
            inbound_buffer: 64,
            dedup_capacity: 512,
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the step budget
    #[must_use]
    pub fn with_step_budget(mut self, budget: usize) -> Self {
        self.step_budget = budget;
        self
    }

    /// Set the context window
    #[must_use]
    pub fn with_context_window(mut self, entries: usize) -> Self {
        self.context_window = entries;
        self
    }

    /// Set whether tool results trigger other agents
    #[must_use]
    pub fn with_tool_results_trigger(mut self, enabled: bool) -> Self {
        self.tool_results_trigger = enabled;
        self
    }

    /// Set whether mentions are exclusive
    #[must_use]
    pub fn with_exclusive_mentions(mut self, enabled: bool) -> Self {
        self.mentions_are_exclusive = enabled;
        self
    }

    /// Per-agent settings derived from this configuration
    #[must_use]
    pub fn agent_settings(&self, model: impl Into<String>) -> AgentSettings {
        AgentSettings {
            model: model.into(),
            context_window: self.context_window,
            relevance_timeout: self.relevance_timeout,
            completion_timeout: self.completion_timeout,
            mentions_are_exclusive: self.mentions_are_exclusive,
            ..AgentSettings::default()
        }
    }
}
