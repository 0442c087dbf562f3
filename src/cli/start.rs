//! `hive start`: run the team on Discord until Ctrl-C

use crate::config::{load_agents, load_settings, AgentDefinition, AGENT_FILE};
use crate::team::build_team;
use anyhow::{bail, Context, Result};
use hive_channels::{AgentConnection, DiscordTeam};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Discord logins for every agent; each agent needs its own bot token
pub fn connections(agents: &[AgentDefinition]) -> Result<Vec<AgentConnection>> {
    agents
        .iter()
        .map(|agent| match &agent.file.discord {
            Some(login) if !login.token.trim().is_empty() => {
                Ok(AgentConnection::new(agent.name(), login.token.trim()))
            }
            _ => bail!(
                "{}: '[discord] token' is required for agent '{}'",
                agent.dir.join(AGENT_FILE).display(),
                agent.name()
            ),
        })
        .collect()
}

pub async fn run(dir: &Path) -> Result<()> {
    let settings = load_settings(dir)?;
    let agents = load_agents(dir)?;
    let connections = connections(&agents)?;
    let names = agents.iter().map(|a| a.name().to_string()).collect();

    let discord = Arc::new(DiscordTeam::new(settings.discord.clone(), connections, names));
    let team = build_team(dir, &settings, &agents, discord.clone())?;

    let shutdown = CancellationToken::new();
    let (tx, rx) = mpsc::channel(team.orchestrator.config().inbound_buffer);

    let logger = team.spawn_event_logger();
    let scheduler = team.spawn_scheduler(&settings, tx.clone(), shutdown.clone());

    let discord_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { discord.run(tx, shutdown).await }
    });

    let orchestrator = Arc::clone(&team.orchestrator);
    let orchestrator_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { orchestrator.run(rx, shutdown).await }
    });

    info!(agents = agents.len(), "Hive team running. Press Ctrl+C to stop.");

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
            info!("Shutdown requested");
        }
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();

    match discord_task.await {
        Ok(Err(e)) => error!("Discord adapter stopped with error: {}", e),
        Err(e) => error!("Discord task failed: {}", e),
        Ok(Ok(())) => {}
    }
    if let Some(scheduler) = scheduler {
        let _ = scheduler.await;
    }
    let _ = orchestrator_task.await;
    logger.abort();

    info!("Hive stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentFile, DiscordLogin};
    use std::path::PathBuf;

    fn agent(name: &str, token: Option<&str>) -> AgentDefinition {
        AgentDefinition {
            file: AgentFile {
                name: name.to_string(),
                skills: Vec::new(),
                discord: token.map(|t| DiscordLogin {
                    token: t.to_string(),
                }),
                llm: None,
                tools: Vec::new(),
            },
            persona: String::new(),
            dir: PathBuf::from("agents").join(name),
        }
    }

    #[test]
    fn test_connections_per_agent() {
        let agents = vec![agent("writer", Some("a.b.c")), agent("planner", Some("d.e.f"))];
        let conns = connections(&agents).unwrap();
        assert_eq!(conns.len(), 2);
        assert_eq!(conns[1].agent, "planner");
    }

    #[test]
    fn test_missing_token_names_file() {
        let agents = vec![agent("writer", Some("a.b.c")), agent("planner", None)];
        let err = connections(&agents).unwrap_err().to_string();
        assert!(err.contains("agents/planner/agent.toml"));
        assert!(err.contains("[discord] token"));
    }
}
