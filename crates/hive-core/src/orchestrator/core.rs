//! Orchestrator core structure
//!
//! Contains the main `Orchestrator` struct and its builder methods.

use super::config::OrchestratorConfig;
use super::dedup::RecentIds;
use super::types::OutboundSink;
use crate::agent::AgentUnit;
use crate::context::ContextLog;
use crate::error::{Error, Result};
use crate::event_bus::{EventBus, TeamEvent};
use crate::profile::Roster;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Owns the shared log and runs every inbound event through the team
pub struct Orchestrator {
    pub(crate) log: Arc<ContextLog>,
    pub(crate) roster: Arc<Roster>,
    pub(crate) agents: Vec<Arc<AgentUnit>>,
    pub(crate) outbound: Arc<dyn OutboundSink>,
    pub(crate) event_bus: Option<EventBus>,
    pub(crate) config: OrchestratorConfig,
    pub(crate) recent_ids: Mutex<RecentIds>,
}

impl Orchestrator {
    /// Create an orchestrator over a fresh log.
    ///
    /// Every roster member needs exactly one unit, in any order; units run
    /// in roster order.
    pub fn new(
        roster: Arc<Roster>,
        agents: Vec<AgentUnit>,
        outbound: Arc<dyn OutboundSink>,
        config: OrchestratorConfig,
    ) -> Result<Self> {
        if let Some(stray) = agents.iter().find(|a| !roster.contains(a.name())) {
            return Err(Error::UnknownAgent(stray.name().to_string()));
        }

        let mut agents: Vec<Option<AgentUnit>> = agents.into_iter().map(Some).collect();
        let mut ordered = Vec::with_capacity(roster.len());
        for name in roster.names() {
            let unit = agents
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|a| a.name() == name))
                .and_then(Option::take)
                .ok_or_else(|| Error::Configuration(format!("no agent unit for '{}'", name)))?;
            ordered.push(Arc::new(unit));
        }
        if let Some(duplicate) = agents.into_iter().flatten().next() {
            return Err(Error::Configuration(format!(
                "more than one agent unit for '{}'",
                duplicate.name()
            )));
        }

        info!(agents = ordered.len(), step_budget = config.step_budget, "Orchestrator ready");
        let recent_ids = Mutex::new(RecentIds::new(config.dedup_capacity));
        Ok(Self {
            log: Arc::new(ContextLog::new()),
            roster,
            agents: ordered,
            outbound,
            event_bus: None,
            config,
            recent_ids,
        })
    }

    /// Publish run, turn and append events on `bus`.
    ///
    /// Replaces the log, so set it before handling events.
    #[must_use]
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.log = Arc::new(ContextLog::new().with_event_bus(bus.clone()));
        self.event_bus = Some(bus);
        self
    }

    /// The shared log
    #[must_use]
    pub fn log(&self) -> &Arc<ContextLog> {
        &self.log
    }

    /// The team
    #[must_use]
    pub fn roster(&self) -> &Arc<Roster> {
        &self.roster
    }

    /// Agent units in roster order
    #[must_use]
    pub fn agents(&self) -> &[Arc<AgentUnit>] {
        &self.agents
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Event bus, if set
    #[must_use]
    pub fn event_bus(&self) -> Option<&EventBus> {
        self.event_bus.as_ref()
    }

    pub(crate) fn emit(&self, event: TeamEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}
