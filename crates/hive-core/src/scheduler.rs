//! Scheduler runner
//!
//! Polls the `schedule` tool's job store and feeds every due job back into
//! the orchestrator as a message from `scheduler` that mentions the owning
//! agent, so the owner is forced to act on it. The event carries the channel
//! the job was created from.

use crate::error::{Error, Result};
use crate::orchestrator::{InboundEvent, SCHEDULER_AUTHOR};
use chrono::{DateTime, Utc};
use hive_tools::{ScheduleStore, ScheduledJob};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Turns due schedule jobs into inbound events
pub struct ScheduleRunner {
    store: Arc<ScheduleStore>,
    inbound: mpsc::Sender<InboundEvent>,
    tick: Duration,
}

impl ScheduleRunner {
    /// Create a runner checking `store` every `tick`
    #[must_use]
    pub fn new(store: Arc<ScheduleStore>, inbound: mpsc::Sender<InboundEvent>, tick: Duration) -> Self {
        Self {
            store,
            inbound,
            tick,
        }
    }

    /// Start the scheduler loop; ends on shutdown or when the orchestrator is gone
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        info!(tick_secs = self.tick.as_secs(), "Scheduler starting");
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Scheduler shutting down");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.tick_once(Utc::now()).await?;
                }
            }
        }
    }

    /// Inject every job due at `now`. Returns how many were sent.
    pub async fn tick_once(&self, now: DateTime<Utc>) -> Result<usize> {
        let due = self.store.take_due(now);
        let count = due.len();
        for job in due {
            debug!(job = %job.id, owner = %job.owner, "Injecting scheduled task");
            self.inbound
                .send(job_event(&job, now))
                .await
                .map_err(|_| Error::ChannelClosed("orchestrator inbound".to_string()))?;
        }
        Ok(count)
    }
}

fn job_event(job: &ScheduledJob, now: DateTime<Utc>) -> InboundEvent {
    InboundEvent {
        author_id: SCHEDULER_AUTHOR.to_string(),
        content: format!("Scheduled task: {}", job.task),
        mentioned_agent_ids: vec![job.owner.clone()],
        timestamp: now,
        external_id: None,
        channel_id: job.channel_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use hive_tools::Schedule;

    fn runner(store: &Arc<ScheduleStore>) -> (ScheduleRunner, mpsc::Receiver<InboundEvent>) {
        let (tx, rx) = mpsc::channel(8);
        (ScheduleRunner::new(Arc::clone(store), tx, Duration::from_secs(30)), rx)
    }

    #[tokio::test]
    async fn test_due_job_becomes_mention() {
        let store = Arc::new(ScheduleStore::new());
        let now = Utc::now();
        store
            .add("writer", Schedule::every_minutes(10).unwrap(), "send the digest", Some("42"), now)
            .unwrap();
        let (runner, mut rx) = runner(&store);

        assert_eq!(runner.tick_once(now).await.unwrap(), 0);
        let later = now + ChronoDuration::minutes(11);
        assert_eq!(runner.tick_once(later).await.unwrap(), 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.author_id, SCHEDULER_AUTHOR);
        assert_eq!(event.content, "Scheduled task: send the digest");
        assert_eq!(event.mentioned_agent_ids, vec!["writer".to_string()]);
        assert_eq!(event.channel_id.as_deref(), Some("42"));

        // advanced, so not due again right away
        assert_eq!(runner.tick_once(later).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_inbound_is_an_error() {
        let store = Arc::new(ScheduleStore::new());
        let now = Utc::now();
        store
            .add("writer", Schedule::every_minutes(1).unwrap(), "ping", None, now)
            .unwrap();
        let (runner, rx) = runner(&store);
        drop(rx);

        let result = runner.tick_once(now + ChronoDuration::minutes(2)).await;
        assert!(matches!(result, Err(Error::ChannelClosed(_))));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let store = Arc::new(ScheduleStore::new());
        let (runner, _rx) = runner(&store);
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        tokio_test::assert_ok!(runner.run(shutdown).await);
    }
}
