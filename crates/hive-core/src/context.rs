//! Shared Context Log
//!
//! The one transcript every agent reasons over. Entries are immutable once
//! appended and ids are dense: the entry with id `n` is the `n`-th entry.
//! Assigning the id and publishing the entry happen under a single write
//! lock, so readers only ever observe complete prefixes.

use crate::event_bus::{EventBus, TeamEvent};
use crate::permissions::PermissionDenial;
use chrono::{DateTime, Utc};
use hive_tools::{BridgeFailure, ToolParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Position of an entry in the log
pub type EntryId = u64;

/// Who wrote a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Author {
    /// A human on the chat platform (or the scheduler)
    User(String),
    /// A team agent
    Agent(String),
    /// The engine itself (failure and budget notices)
    System,
}

impl Author {
    /// Agent name, if an agent wrote this
    #[must_use]
    pub fn agent(&self) -> Option<&str> {
        match self {
            Self::Agent(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(name) | Self::Agent(name) => f.write_str(name),
            Self::System => f.write_str("system"),
        }
    }
}

/// Why a tool call failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum ToolFailure {
    /// Rejected by the permission gate; nothing was sent
    PermissionDenied(PermissionDenial),
    /// The bridge could not produce a payload
    Bridge(BridgeFailure),
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied(denial) => write!(f, "permission denied: {}", denial),
            Self::Bridge(failure) => write!(f, "{}", failure),
        }
    }
}

/// Outcome of one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// Payload returned by the tool
    Success(serde_json::Value),
    /// The call did not succeed
    Failure(ToolFailure),
}

impl ToolOutcome {
    /// Whether the tool succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// A chat message in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEntry {
    /// Sequence id
    pub id: EntryId,
    /// Author
    pub author: Author,
    /// Text
    pub content: String,
    /// Agents explicitly addressed
    pub mentions: BTreeSet<String>,
    /// Append time
    pub timestamp: DateTime<Utc>,
}

/// A tool call and its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultEntry {
    /// Sequence id
    pub id: EntryId,
    /// Agent that asked for the call
    pub requesting_agent: String,
    /// Tool name
    pub tool_name: String,
    /// Action
    pub action: String,
    /// Parameters as parsed
    pub params: ToolParams,
    /// What happened
    pub outcome: ToolOutcome,
    /// Append time
    pub timestamp: DateTime<Utc>,
}

/// One entry of the Shared Context Log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEntry {
    /// Chat message
    Message(MessageEntry),
    /// Tool result
    ToolResult(ToolResultEntry),
}

impl LogEntry {
    /// Sequence id
    #[must_use]
    pub fn id(&self) -> EntryId {
        match self {
            Self::Message(m) => m.id,
            Self::ToolResult(t) => t.id,
        }
    }

    /// Append time
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Message(m) => m.timestamp,
            Self::ToolResult(t) => t.timestamp,
        }
    }

    /// Agent that produced this entry, if any
    #[must_use]
    pub fn producing_agent(&self) -> Option<&str> {
        match self {
            Self::Message(m) => m.author.agent(),
            Self::ToolResult(t) => Some(&t.requesting_agent),
        }
    }

    /// Short label for logs and events
    #[must_use]
    pub fn author_label(&self) -> String {
        match self {
            Self::Message(m) => m.author.to_string(),
            Self::ToolResult(t) => t.requesting_agent.clone(),
        }
    }

    /// Message view of this entry
    #[must_use]
    pub fn as_message(&self) -> Option<&MessageEntry> {
        match self {
            Self::Message(m) => Some(m),
            Self::ToolResult(_) => None,
        }
    }

    /// Tool result view of this entry
    #[must_use]
    pub fn as_tool_result(&self) -> Option<&ToolResultEntry> {
        match self {
            Self::ToolResult(t) => Some(t),
            Self::Message(_) => None,
        }
    }
}

/// An entry before it has an id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub enum EntryDraft {
    /// Message to append
    Message {
        /// Author
        author: Author,
        /// Text
        content: String,
        /// Agents addressed
        mentions: BTreeSet<String>,
    },
    /// Tool result to append
    ToolResult {
        /// Agent that asked for the call
        requesting_agent: String,
        /// Tool name
        tool_name: String,
        /// Action
        action: String,
        /// Parameters
        params: ToolParams,
        /// Outcome
        outcome: ToolOutcome,
    },
}

impl EntryDraft {
    /// Message draft
    #[must_use]
    pub fn message(author: Author, content: impl Into<String>, mentions: BTreeSet<String>) -> Self {
        Self::Message {
            author,
            content: content.into(),
            mentions,
        }
    }

    /// System notice draft
    #[must_use]
    pub fn notice(content: impl Into<String>) -> Self {
        Self::message(Author::System, content, BTreeSet::new())
    }

    fn seal(self, id: EntryId, timestamp: DateTime<Utc>) -> LogEntry {
        match self {
            Self::Message {
                author,
                content,
                mentions,
            } => LogEntry::Message(MessageEntry {
                id,
                author,
                content,
                mentions,
                timestamp,
            }),
            Self::ToolResult {
                requesting_agent,
                tool_name,
                action,
                params,
                outcome,
            } => LogEntry::ToolResult(ToolResultEntry {
                id,
                requesting_agent,
                tool_name,
                action,
                params,
                outcome,
                timestamp,
            }),
        }
    }
}

/// Append-only shared transcript
#[derive(Debug, Default)]
pub struct ContextLog {
    entries: RwLock<Vec<Arc<LogEntry>>>,
    events: Option<EventBus>,
}

impl ContextLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `EntryAppended` on `bus` for every append
    #[must_use]
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Append an entry and return its id.
    ///
    /// Id assignment and insertion are one critical section; nothing else in
    /// the engine takes this lock for writing.
    pub fn append(&self, draft: EntryDraft) -> EntryId {
        let entry = {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            let id = entries.len() as EntryId;
            let entry = Arc::new(draft.seal(id, Utc::now()));
            entries.push(Arc::clone(&entry));
            entry
        };

        debug!(entry_id = entry.id(), author = %entry.author_label(), "Appended log entry");
        if let Some(bus) = &self.events {
            bus.publish(TeamEvent::EntryAppended {
                entry_id: entry.id(),
                author: entry.author_label(),
                tool_result: entry.as_tool_result().is_some(),
            });
        }
        entry.id()
    }

    /// Entries with `id >= from`, as of now.
    ///
    /// The view is a snapshot: later appends never show up in it, and it can
    /// be iterated any number of times.
    #[must_use]
    pub fn read_from(&self, from: EntryId) -> ContextView {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(entries.len());
        ContextView {
            entries: entries[start..].to_vec(),
        }
    }

    /// The whole log as of now
    #[must_use]
    pub fn snapshot(&self) -> ContextView {
        self.read_from(0)
    }

    /// One entry
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<Arc<LogEntry>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        usize::try_from(id).ok().and_then(|i| entries.get(i).cloned())
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Id the next append will receive
    #[must_use]
    pub fn next_id(&self) -> EntryId {
        self.len() as EntryId
    }
}

/// Finite, ordered snapshot of part of the log
#[derive(Debug, Clone, Default)]
pub struct ContextView {
    entries: Vec<Arc<LogEntry>>,
}

impl ContextView {
    /// Iterate in log order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter().map(|e| e.as_ref())
    }

    /// Number of entries in the view
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the view is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last `n` entries of this view
    #[must_use]
    pub fn tail(&self, n: usize) -> ContextView {
        let start = self.entries.len().saturating_sub(n);
        ContextView {
            entries: self.entries[start..].to_vec(),
        }
    }

    /// Id one past the last entry, or `None` when empty
    #[must_use]
    pub fn end(&self) -> Option<EntryId> {
        self.entries.last().map(|e| e.id() + 1)
    }

    /// Shared handles to the entries
    #[must_use]
    pub fn entries(&self) -> &[Arc<LogEntry>] {
        &self.entries
    }
}
