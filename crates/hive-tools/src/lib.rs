//! Hive Tools - Tool Bridge
//!
//! This crate carries authorized tool calls out of the agent team:
//! - Protocol: the `{tool_name, action, params}` wire request and the strict
//!   `{status, payload | message}` response validation
//! - Bridge: the `ToolInvoker` seam and the timeout-bounded HTTP bridge
//! - Registry: tool name to endpoint binding
//! - Schedule: the built-in `schedule` tool and its in-memory job store
//! - ToolBox: dispatch to local tools first, remote endpoints otherwise

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod schedule;
pub mod toolbox;

pub use bridge::{BridgeFailure, HttpToolBridge, ToolInvocation, ToolInvoker};
pub use error::{Error, Result};
pub use protocol::{ToolRequest, ToolResponse, ToolStatus};
pub use registry::{ToolEndpoint, ToolRegistry};
pub use schedule::{Schedule, ScheduleStore, ScheduleTool, ScheduledJob, SCHEDULE_TOOL};
pub use toolbox::ToolBox;

/// Parameter bag carried by every tool call: string keys to string values.
pub type ToolParams = std::collections::BTreeMap<String, String>;
