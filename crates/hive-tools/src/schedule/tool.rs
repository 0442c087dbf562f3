use super::{Schedule, ScheduleStore};
use crate::bridge::{BridgeFailure, ToolInvocation};
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

/// Name agents use to call the schedule tool
pub const SCHEDULE_TOOL: &str = "schedule";

/// Local tool answering `write`, `read`/`list` and `delete` on a [`ScheduleStore`].
#[derive(Debug, Clone)]
pub struct ScheduleTool {
    store: Arc<ScheduleStore>,
}

impl ScheduleTool {
    /// Create a tool backed by `store`
    #[must_use]
    pub fn new(store: Arc<ScheduleStore>) -> Self {
        Self { store }
    }

    /// Backing store
    #[must_use]
    pub fn store(&self) -> &Arc<ScheduleStore> {
        &self.store
    }

    /// Run one call at time `now`.
    pub fn handle(
        &self,
        invocation: &ToolInvocation,
        now: DateTime<Utc>,
    ) -> Result<serde_json::Value, BridgeFailure> {
        let params = &invocation.params;
        let owner = invocation.agent.as_str();

        match invocation.action.as_str() {
            "write" | "create" => {
                let schedule = self.schedule_from(invocation)?;
                let task = params.get("task").map(String::as_str).unwrap_or_default();
                let job = self
                    .store
                    .add(owner, schedule, task, invocation.channel_id.as_deref(), now)
                    .map_err(invalid_params)?;
                Ok(json!({
                    "job_id": job.id,
                    "schedule": job.schedule.to_string(),
                    "task": job.task,
                    "next_run": job.next_run.to_rfc3339(),
                }))
            }
            "read" | "list" => {
                let jobs: Vec<_> = self
                    .store
                    .list(owner)
                    .into_iter()
                    .map(|job| {
                        json!({
                            "job_id": job.id,
                            "schedule": job.schedule.to_string(),
                            "task": job.task,
                            "next_run": job.next_run.to_rfc3339(),
                        })
                    })
                    .collect();
                Ok(json!({ "jobs": jobs }))
            }
            "delete" => {
                let job_id = params
                    .get("job_id")
                    .ok_or_else(|| invalid_params(Error::InvalidInput("job_id is required".into())))?;
                let job = self.store.delete(owner, job_id).map_err(|e| {
                    BridgeFailure::RemoteError {
                        code: "not_found".to_string(),
                        message: e.to_string(),
                    }
                })?;
                Ok(json!({ "deleted": job.id }))
            }
            other => Err(BridgeFailure::RemoteError {
                code: "unsupported_action".to_string(),
                message: format!("schedule does not support action '{}'", other),
            }),
        }
    }

    fn schedule_from(&self, invocation: &ToolInvocation) -> Result<Schedule, BridgeFailure> {
        let params = &invocation.params;
        let kind = params.get("type").map(|t| t.trim().to_lowercase());
        let kind = kind.as_deref().unwrap_or(if params.contains_key("cron") {
            "cron"
        } else {
            "interval"
        });

        let schedule = match kind {
            "interval" => params
                .get("interval_minutes")
                .ok_or_else(|| Error::InvalidInput("interval_minutes is required".into()))
                .and_then(|m| {
                    m.trim().parse::<u32>().map_err(|_| {
                        Error::InvalidInput(format!("interval_minutes '{}' is not a number", m))
                    })
                })
                .and_then(Schedule::every_minutes),
            "cron" => params
                .get("cron")
                .ok_or_else(|| Error::InvalidInput("cron is required".into()))
                .and_then(|c| Schedule::parse_cron(c)),
            other => Err(Error::InvalidInput(format!(
                "unknown schedule type '{}' (expected interval or cron)",
                other
            ))),
        };
        schedule.map_err(invalid_params)
    }
}

fn invalid_params(error: Error) -> BridgeFailure {
    BridgeFailure::RemoteError {
        code: "invalid_params".to_string(),
        message: error.to_string(),
    }
}
