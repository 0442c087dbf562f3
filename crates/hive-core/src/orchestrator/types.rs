//! Orchestrator types and traits
//!
//! - `OutboundSink`, the chat-platform posting seam
//! - `RunReport`, what one inbound event led to

use crate::agent::TurnReport;
use crate::context::EntryId;
use uuid::Uuid;

/// Author id used for scheduled-task events
pub const SCHEDULER_AUTHOR: &str = "scheduler";

/// Posts agent output to the chat platform
#[async_trait::async_trait]
pub trait OutboundSink: Send + Sync {
    /// Post `text` as `agent`
    async fn post(&self, agent: &str, text: &str) -> crate::Result<()>;

    /// Posts of the run that starts now belong in `channel`
    fn focus(&self, _channel: &str) {}
}

/// Result of handling one inbound event
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Run identifier
    pub run_id: Uuid,
    /// Entry the inbound event was appended as
    pub entry_id: EntryId,
    /// Turns taken, in the order they were scheduled
    pub turns: Vec<TurnReport>,
    /// Whether the step budget cut the run short
    pub budget_exhausted: bool,
    /// Entries (or agent turns) left unprocessed when the budget ran out
    pub pending: usize,
}

impl RunReport {
    /// Number of agent turns
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// Agents that took a turn, in order
    #[must_use]
    pub fn agents(&self) -> Vec<&str> {
        self.turns.iter().map(|t| t.agent.as_str()).collect()
    }
}
