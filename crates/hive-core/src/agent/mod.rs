//! Agent Decision Unit
//!
//! One unit per agent. For every log entry the orchestrator fans out, the
//! unit decides whether to act ([`AgentUnit::evaluate`]); when it acts
//! ([`AgentUnit::act`]) it completes against a snapshot of the log, runs the
//! tool calls it asked for through the permission gate and the tool bridge,
//! and appends the results and its reply to the shared log.
//!
//! # Module Structure
//!
//! - `prompt`: system prompt, context rendering and the relevance question
//! - `decision`: Idle → MustAct evaluation
//! - `turn`: MustAct → Producing → Idle

mod decision;
mod prompt;
mod turn;


pub use prompt::PromptBuilder;

use crate::event_bus::EventBus;
use crate::profile::{AgentProfile, Roster};
use crate::context::EntryId;
use crate::parser::ParseWarning;
use hive_llm::LlmProvider;
use hive_tools::ToolInvoker;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Where an agent is in its per-entry cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Waiting for entries
    Idle,
    /// Decided to act, completion requested
    MustAct,
    /// Handling the completion (tool calls, reply)
    Producing,
}

/// Why an agent acts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The entry mentions the agent
    Mentioned,
    /// The relevance check answered yes
    Relevant,
}

/// Outcome of relevance evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Stay silent
    Idle,
    /// Take a turn
    Act(Trigger),
}

impl Decision {
    /// Whether the agent acts
    #[must_use]
    pub fn acts(&self) -> bool {
        matches!(self, Self::Act(_))
    }
}

/// Why a turn produced no completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TurnFailure {
    /// Transport, auth or response error from the provider
    Provider(String),
    /// The provider throttled the request
    RateLimited,
    /// No completion within the configured bound
    Timeout(Duration),
}

impl From<hive_llm::Error> for TurnFailure {
    fn from(error: hive_llm::Error) -> Self {
        match error {
            hive_llm::Error::RateLimited { .. } => Self::RateLimited,
            hive_llm::Error::Timeout(after) => Self::Timeout(after),
            other => Self::Provider(other.to_string()),
        }
    }
}

impl fmt::Display for TurnFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(msg) => write!(f, "provider error: {}", msg),
            Self::RateLimited => f.write_str("rate limited by the provider"),
            Self::Timeout(d) => write!(f, "no completion within {}s", d.as_secs_f32()),
        }
    }
}

/// What one turn did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Agent name
    pub agent: String,
    /// Entry the turn reacted to
    pub trigger_entry: EntryId,
    /// Entries appended, in order
    pub appended: Vec<EntryId>,
    /// Text to post on the chat platform
    pub outbound: Option<String>,
    /// Tool calls attempted (denied ones included)
    pub tool_calls: usize,
    /// Malformed tool calls dropped
    pub warnings: Vec<ParseWarning>,
    /// Completion failure, if the turn ended in a notice
    pub failure: Option<TurnFailure>,
}

/// Tunables for one agent
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Model override (empty for the provider default)
    pub model: String,
    /// Entries of context given to the LLM
    pub context_window: usize,
    /// Bound on the relevance call
    pub relevance_timeout: Duration,
    /// Bound on the full completion
    pub completion_timeout: Duration,
    /// Mentions of other agents keep this one silent
    pub mentions_are_exclusive: bool,
    /// Max tokens for completions
    pub max_tokens: Option<u32>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: String::new(),
            context_window: 30,
            relevance_timeout: Duration::from_secs(20),
            completion_timeout: Duration::from_secs(90),
            mentions_are_exclusive: true,
            max_tokens: None,
        }
    }
}

/// One agent's decision unit
pub struct AgentUnit {
    profile: Arc<AgentProfile>,
    roster: Arc<Roster>,
    llm: Arc<dyn LlmProvider>,
    tools: Arc<dyn ToolInvoker>,
    settings: AgentSettings,
    prompt: PromptBuilder,
    state: Mutex<AgentState>,
    events: Option<EventBus>,
}

impl AgentUnit {
    /// Create a unit for `profile`, which must be on `roster`
    #[must_use]
    pub fn new(
        profile: Arc<AgentProfile>,
        roster: Arc<Roster>,
        llm: Arc<dyn LlmProvider>,
        tools: Arc<dyn ToolInvoker>,
        settings: AgentSettings,
    ) -> Self {
        let prompt = PromptBuilder::new(&profile, &roster);
        Self {
            profile,
            roster,
            llm,
            tools,
            settings,
            prompt,
            state: Mutex::new(AgentState::Idle),
            events: None,
        }
    }

    /// Publish parse warnings and denials on `bus`
    #[must_use]
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Agent name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    /// Agent profile
    #[must_use]
    pub fn profile(&self) -> &Arc<AgentProfile> {
        &self.profile
    }

    /// LLM provider in use
    #[must_use]
    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> AgentState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// System prompt this agent completes with
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        self.prompt.system_prompt()
    }

    fn set_state(&self, state: AgentState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }
}

impl fmt::Debug for AgentUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentUnit")
            .field("name", &self.profile.name)
            .field("provider", &self.llm.name())
            .field("state", &self.state())
            .finish()
    }
}
