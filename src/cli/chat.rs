//! `hive chat`: the team with a terminal transport
//!
//! Each stdin line is one human message; agent posts are printed as
//! `[agent] text`. `/quit` or end of input stops the session.

use crate::config::{load_agents, load_settings};
use crate::team::build_team;
use anyhow::{Context, Result};
use async_trait::async_trait;
use hive_core::{InboundEvent, OutboundSink};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Author id used for terminal messages
pub const CONSOLE_AUTHOR: &str = "you";

/// Prints agent posts to stdout
pub struct ConsoleOutbound;

#[async_trait]
impl OutboundSink for ConsoleOutbound {
    async fn post(&self, agent: &str, text: &str) -> hive_core::Result<()> {
        println!("{}", render_post(agent, text));
        Ok(())
    }
}

fn render_post(agent: &str, text: &str) -> String {
    format!("[{}] {}", agent, text.trim_end())
}

/// Turn a terminal line into an inbound event; `None` for blank lines
pub fn line_event(line: &str) -> Option<InboundEvent> {
    let content = line.trim();
    if content.is_empty() {
        return None;
    }
    Some(InboundEvent::new(CONSOLE_AUTHOR, content))
}

pub async fn run(dir: &Path) -> Result<()> {
    let settings = load_settings(dir)?;
    let agents = load_agents(dir)?;
    let team = build_team(dir, &settings, &agents, Arc::new(ConsoleOutbound))?;

    let shutdown = CancellationToken::new();
    let (tx, rx) = mpsc::channel(team.orchestrator.config().inbound_buffer);
    let scheduler = team.spawn_scheduler(&settings, tx.clone(), shutdown.clone());

    let orchestrator = Arc::clone(&team.orchestrator);
    let orchestrator_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { orchestrator.run(rx, shutdown).await }
    });

    let names: Vec<&str> = agents.iter().map(|a| a.name()).collect();
    println!("💬 Chatting with {}. Mention agents with @name; /quit to exit.", names.join(", "));
    info!(agents = names.len(), "Chat session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if line.trim() == "/quit" {
                    break;
                }
                if let Some(event) = line_event(&line) {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    shutdown.cancel();
    drop(tx);
    if let Some(scheduler) = scheduler {
        let _ = scheduler.await;
    }
    let _ = orchestrator_task.await;
    Ok(())
}
