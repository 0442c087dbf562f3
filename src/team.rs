//! Team assembly
//!
//! Turns settings and agent definitions into a running orchestrator: the
//! roster, one LLM provider per agent, the tool registry and the shared
//! schedule store loaded from the config directory.

use crate::config::{AgentDefinition, Settings, SCHEDULES_FILE};
use anyhow::{bail, Context, Result};
use hive_core::{
    AgentUnit, EventBus, InboundEvent, Orchestrator, OutboundSink, Roster, ScheduleRunner,
    TeamEvent,
};
use hive_tools::{HttpToolBridge, ScheduleStore, ToolBox, ToolRegistry};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Event bus capacity for team events
const EVENT_BUS_CAPACITY: usize = 256;

/// A fully wired team
pub struct Team {
    pub orchestrator: Arc<Orchestrator>,
    pub event_bus: EventBus,
    pub schedule: Arc<ScheduleStore>,
}

/// Collect every tool endpoint the agents declare.
///
/// The first endpoint wins when two agents bind the same tool differently.
pub fn build_registry(agents: &[AgentDefinition]) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    for agent in agents {
        for tool in &agent.file.tools {
            if let Some(endpoint) = &tool.endpoint {
                registry
                    .register(tool.name.trim(), endpoint.as_str())
                    .with_context(|| format!("Agent '{}' tool '{}'", agent.name(), tool.name))?;
            }
        }
    }
    Ok(registry)
}

/// Build the team for `agents` of the config directory `dir`, posting
/// replies through `outbound`
pub fn build_team(
    dir: &Path,
    settings: &Settings,
    agents: &[AgentDefinition],
    outbound: Arc<dyn OutboundSink>,
) -> Result<Team> {
    if agents.is_empty() {
        bail!("No agents configured. Run 'hive add-agent <name>' first.");
    }

    let roster = Arc::new(Roster::new(agents.iter().map(AgentDefinition::profile).collect())?);
    let config = settings.orchestrator.to_config();
    let event_bus = EventBus::new(EVENT_BUS_CAPACITY);

    let registry = build_registry(agents)?;
    let bridge = HttpToolBridge::new(Duration::from_secs(settings.tools.timeout_secs.max(1)))
        .context("Failed to create tool bridge")?;
    let schedule_path = dir.join(SCHEDULES_FILE);
    let schedule = Arc::new(
        ScheduleStore::open(&schedule_path)
            .with_context(|| format!("Failed to load {}", schedule_path.display()))?,
    );
    let tools = Arc::new(ToolBox::new(registry, bridge).with_schedule(Arc::clone(&schedule)));

    let mut units = Vec::with_capacity(agents.len());
    for (agent, profile) in agents.iter().zip(roster.iter()) {
        let selection = settings
            .default_llm
            .selection(profile.llm_override.as_ref(), config.completion_timeout);
        let llm = hive_llm::provider_from_selection(&selection)
            .with_context(|| format!("LLM provider for agent '{}'", agent.name()))?;
        info!(
            agent = %profile.name,
            provider = %llm.name(),
            model = %selection.model,
            "Agent ready"
        );

        for (tool, _) in profile.enabled_tools() {
            if !tools.serves(tool) {
                warn!(agent = %profile.name, tool = %tool, "Tool has no endpoint; calls will fail");
            }
        }

        units.push(
            AgentUnit::new(
                Arc::clone(profile),
                Arc::clone(&roster),
                llm,
                tools.clone(),
                config.agent_settings(selection.model.clone()),
            )
            .with_event_bus(event_bus.clone()),
        );
    }

    let orchestrator = Orchestrator::new(roster, units, outbound, config)?
        .with_event_bus(event_bus.clone());

    Ok(Team {
        orchestrator: Arc::new(orchestrator),
        event_bus,
        schedule,
    })
}

impl Team {
    /// Spawn the scheduler runner feeding `inbound`
    pub fn spawn_scheduler(
        &self,
        settings: &Settings,
        inbound: mpsc::Sender<InboundEvent>,
        shutdown: CancellationToken,
    ) -> Option<tokio::task::JoinHandle<()>> {
        if !settings.scheduler.enabled {
            info!("Scheduler disabled by configuration");
            return None;
        }
        let runner = ScheduleRunner::new(
            Arc::clone(&self.schedule),
            inbound,
            Duration::from_secs(settings.scheduler.tick_secs.max(1)),
        );
        Some(tokio::spawn(async move {
            if let Err(e) = runner.run(shutdown).await {
                warn!("Scheduler stopped: {}", e);
            }
        }))
    }

    /// Spawn a task logging team events until the bus closes
    pub fn spawn_event_logger(&self) -> tokio::task::JoinHandle<()> {
        let mut rx = self.event_bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => log_event(&event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "Event logger lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

fn log_event(event: &TeamEvent) {
    match event {
        TeamEvent::TurnStarted {
            agent, mentioned, ..
        } => info!(agent = %agent, mentioned, "Agent acting"),
        TeamEvent::ParseWarning { agent, warning } => {
            warn!(agent = %agent, "Dropped tool call: {}", warning)
        }
        TeamEvent::ToolDenied {
            agent,
            tool,
            action,
            reason,
        } => warn!(agent = %agent, tool = %tool, action = %action, "Tool call denied: {}", reason),
        TeamEvent::BudgetExhausted {
            budget, pending, ..
        } => warn!(budget, pending, "Step budget exhausted"),
        TeamEvent::RunFinished { run_id, turns } => {
            info!(run_id = %run_id, turns, "Run finished")
        }
        other => debug!(event = ?other, "Team event"),
    }
}
