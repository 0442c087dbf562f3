//! Hive Core - Team Orchestration Engine
//!
//! This crate turns one inbound chat message into a bounded round of agent
//! turns over a single shared transcript:
//! - Context: the append-only Shared Context Log every agent reads
//! - Parser: tool calls embedded in agent output (`[TOOL: .. | action: .. | params: ..]`)
//! - Permissions: the pure per-agent tool/action gate
//! - Agent: the per-agent decision unit (relevance, completion, tool calls)
//! - Orchestrator: fan-out, step budget, dedup and the inbound/outbound seams
//! - Scheduler: feeds due `schedule` jobs back in as mentions
//! - EventBus: broadcast of team lifecycle events

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agent;
pub mod context;
pub mod error;
pub mod event_bus;
pub mod mention;
pub mod orchestrator;
pub mod parser;
pub mod permissions;
pub mod profile;
pub mod scheduler;

#[cfg(test)]
mod test_support;

pub use agent::{AgentSettings, AgentState, AgentUnit, Decision, PromptBuilder, Trigger, TurnFailure, TurnReport};
pub use context::{
    Author, ContextLog, ContextView, EntryDraft, EntryId, LogEntry, MessageEntry, ToolFailure,
    ToolOutcome, ToolResultEntry,
};
pub use error::{format_error_for_cli, Error, Result, UserFriendlyError};
pub use event_bus::{EventBus, TeamEvent};
pub use orchestrator::{
    InboundEvent, Orchestrator, OrchestratorConfig, OutboundSink, RunReport, SCHEDULER_AUTHOR,
};
pub use parser::{parse_tool_calls, ParseWarning, ParseWarningKind, ParsedOutput, ToolCallRequest};
pub use permissions::{authorize, PermissionDenial, ToolPermission};
pub use profile::{AgentProfile, LlmOverride, Roster};
pub use scheduler::ScheduleRunner;
