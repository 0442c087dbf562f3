//! Hive Channels - Chat-Platform Adapters
//!
//! This crate connects a Hive team to a chat platform:
//! - Discord (via serenity): one bot connection per agent, all feeding the
//!   orchestrator's single inbound channel and posting through `OutboundSink`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod discord;
pub mod error;
pub mod util;

pub use error::{Error, Result};

// Re-export Discord adapter
pub use discord::{AgentConnection, DiscordConfig, DiscordTeam, IncomingMessage, TeamDirectory};
