//! Run loop
//!
//! `handle_event` is one run: append the inbound message, then process log
//! entries in id order. For each entry every idle agent evaluates it
//! concurrently against the same snapshot; the agents that act take their
//! turns concurrently and their appended entries join the queue. Turns are
//! counted against the step budget; mentioned agents are scheduled before
//! agents that merely found the entry relevant. The budget is only declared
//! exhausted once an entry that some agent would act on is left over.

use super::config::InboundEvent;
use super::core::Orchestrator;
use super::types::RunReport;
use crate::agent::{AgentUnit, Decision, Trigger, TurnReport};
use crate::context::{Author, EntryDraft, EntryId, LogEntry};
use crate::event_bus::TeamEvent;
use crate::mention::extract_mentions;
use futures::future::join_all;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

impl Orchestrator {
    /// Listen for inbound events until the channel closes or `shutdown` fires.
    ///
    /// Events are handled one at a time, so runs never interleave.
    pub async fn run(&self, mut inbound: mpsc::Receiver<InboundEvent>, shutdown: CancellationToken) {
        info!("Orchestrator listening for inbound events");
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Orchestrator shutting down");
                    break;
                }
                event = inbound.recv() => match event {
                    Some(event) => {
                        self.handle_event(event).await;
                    }
                    None => {
                        info!("Inbound channel closed");
                        break;
                    }
                },
            }
        }
    }

    /// Run the team on one inbound event.
    ///
    /// Returns `None` when the event is dropped: a platform message id that
    /// was already ingested, or blank content.
    #[instrument(skip_all, fields(author = %event.author_id))]
    pub async fn handle_event(&self, event: InboundEvent) -> Option<RunReport> {
        if let Some(external_id) = &event.external_id {
            let fresh = self
                .recent_ids
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(external_id);
            if !fresh {
                debug!(external_id = %external_id, "Duplicate inbound event dropped");
                return None;
            }
        }
        if event.content.trim().is_empty() {
            debug!("Blank inbound event dropped");
            return None;
        }

        let channel = event.channel_id.clone();
        if let Some(channel) = &channel {
            self.outbound.focus(channel);
        }

        let mentions = self.inbound_mentions(&event);
        let entry_id = self.log.append(EntryDraft::message(
            Author::User(event.author_id.clone()),
            event.content,
            mentions,
        ));

        let run_id = Uuid::new_v4();
        info!(run_id = %run_id, entry_id, "Run started");
        self.emit(TeamEvent::RunStarted { run_id, entry_id });

        let mut report = RunReport {
            run_id,
            entry_id,
            turns: Vec::new(),
            budget_exhausted: false,
            pending: 0,
        };
        let budget = self.config.step_budget;
        let mut queue = VecDeque::from([entry_id]);
        let mut cursor = entry_id + 1;

        while let Some(current) = queue.pop_front() {
            let end = self.log.next_id();
            let from = self
                .agents
                .iter()
                .map(|agent| agent.view_start(current, end))
                .min()
                .unwrap_or(current);
            let view = self.log.read_from(from);
            let Some(entry) = self.log.get(current) else {
                warn!(entry_id = current, "Queued entry missing from log");
                continue;
            };

            let decisions = join_all(self.agents.iter().map(|agent| agent.evaluate(&entry, &view))).await;
            let mut actors: Vec<(&Arc<AgentUnit>, Trigger)> = self
                .agents
                .iter()
                .zip(decisions)
                .filter_map(|(agent, decision)| match decision {
                    Decision::Act(trigger) => Some((agent, trigger)),
                    Decision::Idle => None,
                })
                .collect();
            actors.sort_by_key(|(_, trigger)| *trigger != Trigger::Mentioned);
            if actors.is_empty() {
                debug!(entry_id = current, "No agent acts");
                continue;
            }

            let remaining = budget.saturating_sub(report.turns.len());
            if remaining == 0 {
                report.budget_exhausted = true;
                report.pending = queue.len() + 1;
                break;
            }
            if actors.len() > remaining {
                let skipped: Vec<&str> = actors[remaining..].iter().map(|(a, _)| a.name()).collect();
                warn!(entry_id = current, skipped = ?skipped, "Step budget leaves no turns for some agents");
                report.budget_exhausted = true;
                report.pending = skipped.len() + queue.len();
                actors.truncate(remaining);
            }

            for (agent, trigger) in &actors {
                debug!(agent = %agent.name(), entry_id = current, trigger = ?trigger, "Agent takes a turn");
                self.emit(TeamEvent::TurnStarted {
                    run_id,
                    agent: agent.name().to_string(),
                    trigger: current,
                    mentioned: *trigger == Trigger::Mentioned,
                });
            }

            let turns = join_all(actors.iter().map(|(agent, _)| agent.act(current, &view, &self.log, channel.as_deref()))).await;
            for turn in turns {
                self.post_turn(run_id, &turn).await;
                report.turns.push(turn);
            }

            let fresh = self.log.read_from(cursor);
            if let Some(end) = fresh.end() {
                cursor = end;
            }
            queue.extend(fresh.iter().filter(|e| self.triggers(e)).map(LogEntry::id));

            if report.budget_exhausted {
                report.pending = report.pending.max(queue.len());
                break;
            }
        }

        if report.budget_exhausted {
            self.budget_notice(&report).await;
        }

        info!(run_id = %run_id, turns = report.turns.len(), budget_exhausted = report.budget_exhausted, "Run finished");
        self.emit(TeamEvent::RunFinished {
            run_id,
            turns: report.turns.len(),
        });
        Some(report)
    }

    /// Platform mentions resolved against the roster, plus `@name` tokens
    fn inbound_mentions(&self, event: &InboundEvent) -> BTreeSet<String> {
        let mut mentions = extract_mentions(&event.content, &self.roster);
        for id in &event.mentioned_agent_ids {
            match self.roster.resolve(id) {
                Some(name) => {
                    mentions.insert(name.to_string());
                }
                None => debug!(mention = %id, "Ignoring mention of unknown agent"),
            }
        }
        mentions
    }

    /// Whether a freshly appended entry is fanned out
    fn triggers(&self, entry: &LogEntry) -> bool {
        match entry {
            LogEntry::Message(m) => m.author != Author::System,
            LogEntry::ToolResult(_) => self.config.tool_results_trigger,
        }
    }

    async fn post_turn(&self, run_id: Uuid, turn: &TurnReport) {
        self.emit(TeamEvent::TurnFinished {
            run_id,
            agent: turn.agent.clone(),
            appended: turn.appended.len(),
            failed: turn.failure.is_some(),
        });
        if let Some(text) = &turn.outbound {
            if let Err(e) = self.outbound.post(&turn.agent, text).await {
                warn!(agent = %turn.agent, error = %e, "Outbound post failed");
            }
        }
    }

    async fn budget_notice(&self, report: &RunReport) {
        let budget = self.config.step_budget;
        warn!(run_id = %report.run_id, budget, pending = report.pending, "Step budget exhausted");
        self.emit(TeamEvent::BudgetExhausted {
            run_id: report.run_id,
            budget,
            pending: report.pending,
        });

        let notice = format!(
            "⏹️ Step budget of {} turns reached for this message; {} pending item(s) were not processed.",
            budget, report.pending
        );
        let id: EntryId = self.log.append(EntryDraft::notice(&notice));
        debug!(entry_id = id, "Budget notice appended");

        let voice = report
            .turns
            .last()
            .map(|t| t.agent.as_str())
            .or_else(|| self.roster.names().next());
        if let Some(agent) = voice {
            if let Err(e) = self.outbound.post(agent, &notice).await {
                warn!(agent = %agent, error = %e, "Outbound post failed");
            }
        }
    }
}
