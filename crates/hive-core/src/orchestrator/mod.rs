//! Orchestrator - per-event run loop
//!
//! Ties the shared log, the agent units and the chat-platform seams together.
//! One inbound event starts a run: the event is appended, every agent
//! evaluates it, the chosen agents take their turns, and whatever they
//! append is fed back in until nobody acts or the step budget is spent.
//!
//! # Module Structure
//!
//! - `config`: `OrchestratorConfig` and the `InboundEvent` input type
//! - `types`: `OutboundSink` and `RunReport`
//! - `core`: `Orchestrator` struct and builder methods
//! - `process`: the run loop and the inbound listener
//! - `dedup`: bounded memory of ingested platform message ids

mod config;
mod core;
mod dedup;
mod process;
mod types;

#[cfg(test)]
mod tests;

pub use config::{InboundEvent, OrchestratorConfig};
pub use core::Orchestrator;
pub use types::{OutboundSink, RunReport, SCHEDULER_AUTHOR};
