//! EventBus - broadcast of team lifecycle events
//!
//! Subscribers (the CLI, tests) observe runs without touching the log.
//! Slow subscribers miss events (lagged) rather than blocking the team.

use crate::context::EntryId;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted while the team works on an inbound event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TeamEvent {
    /// A run started for an inbound event
    RunStarted {
        /// Run identifier
        run_id: Uuid,
        /// Entry the inbound event was appended as
        entry_id: EntryId,
    },
    /// An entry was appended to the shared log
    EntryAppended {
        /// Entry id
        entry_id: EntryId,
        /// Author (or requesting agent) label
        author: String,
        /// Whether the entry is a tool result
        tool_result: bool,
    },
    /// An agent started a turn
    TurnStarted {
        /// Run identifier
        run_id: Uuid,
        /// Agent name
        agent: String,
        /// Entry that triggered the turn
        trigger: EntryId,
        /// Whether the agent was mentioned
        mentioned: bool,
    },
    /// An agent finished a turn
    TurnFinished {
        /// Run identifier
        run_id: Uuid,
        /// Agent name
        agent: String,
        /// Entries appended during the turn
        appended: usize,
        /// Whether the turn ended in a failure notice
        failed: bool,
    },
    /// A malformed tool call was dropped
    ParseWarning {
        /// Agent name
        agent: String,
        /// Problem description
        warning: String,
    },
    /// A tool call was denied by the permission gate
    ToolDenied {
        /// Agent name
        agent: String,
        /// Tool name
        tool: String,
        /// Action
        action: String,
        /// Denial reason
        reason: String,
    },
    /// The step budget ran out with entries still unprocessed
    BudgetExhausted {
        /// Run identifier
        run_id: Uuid,
        /// Budget that was spent
        budget: usize,
        /// Entries left unprocessed
        pending: usize,
    },
    /// A run finished
    RunFinished {
        /// Run identifier
        run_id: Uuid,
        /// Agent turns taken
        turns: usize,
    },
}

/// Broadcast-based event bus for team events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TeamEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events. Returns a receiver that will get all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TeamEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all active subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: TeamEvent) -> usize {
        // send() returns Err if there are no receivers, which is fine
        self.sender.send(event).unwrap_or(0)
    }

    /// Get the current number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_subscribe_in_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let run_id = Uuid::new_v4();

        bus.publish(TeamEvent::RunStarted { run_id, entry_id: 0 });
        bus.publish(TeamEvent::RunFinished { run_id, turns: 2 });

        assert!(matches!(rx.recv().await.unwrap(), TeamEvent::RunStarted { entry_id: 0, .. }));
        match rx.recv().await.unwrap() {
            TeamEvent::RunFinished { turns, .. } => assert_eq!(turns, 2),
            other => panic!("expected RunFinished, got: {:?}", other),
        }
    }

    #[test]
    fn test_publish_no_subscribers() {
        let bus = EventBus::new(4);
        let count = bus.publish(TeamEvent::ParseWarning {
            agent: "writer".to_string(),
            warning: "missing action".to_string(),
        });
        assert_eq!(count, 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serialization() {
        let event = TeamEvent::ToolDenied {
            agent: "writer".to_string(),
            tool: "gmail".to_string(),
            action: "send".to_string(),
            reason: "action 'send' is not allowed on 'gmail'".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "tool_denied");
        assert_eq!(json["tool"], "gmail");
    }
}
