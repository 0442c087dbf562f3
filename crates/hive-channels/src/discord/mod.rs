//! Discord - serenity adapter
//!
//! Every agent logs in with its own bot token. All connections feed the same
//! orchestrator inbound channel; a human message is therefore received once
//! per agent and carries its Discord message id so the orchestrator ingests
//! it once.

pub mod adapter;
pub mod config;
pub mod directory;
pub mod handler;

pub use adapter::DiscordTeam;
pub use config::{AgentConnection, DiscordConfig};
pub use directory::{IncomingMessage, TeamDirectory};
