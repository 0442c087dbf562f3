//! Schedule - the built-in `schedule` tool
//!
//! Agents create recurring jobs with `[TOOL: schedule | action: write | ...]`.
//! A store opened on a file keeps its jobs there as TOML and rewrites the
//! file after every change, so jobs survive a restart. A runner in
//! `hive-core` drains due jobs with [`ScheduleStore::take_due`] and feeds
//! them back to the owning agent as a mention, in the channel the job was
//! created from.

mod tool;


pub use tool::{ScheduleTool, SCHEDULE_TOOL};

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Minutes to wait when no cron match is found in the search horizon
const FALLBACK_MINUTES: i64 = 5;

/// Two days of minutes covers every `minute hour * * *` pattern
const CRON_SEARCH_HORIZON: i64 = 2 * 24 * 60;

/// When a job fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schedule {
    /// Every N minutes
    Interval {
        /// Period in minutes (at least 1)
        minutes: u32,
    },
    /// Daily cron of the form `minute hour * * *` (`*` matches any value)
    Cron {
        /// Minute of the hour, `None` for every minute
        minute: Option<u32>,
        /// Hour of the day, `None` for every hour
        hour: Option<u32>,
    },
}

impl Schedule {
    /// Interval schedule
    pub fn every_minutes(minutes: u32) -> Result<Self> {
        if minutes == 0 {
            return Err(Error::Schedule("interval_minutes must be at least 1".to_string()));
        }
        Ok(Self::Interval { minutes })
    }

    /// Parse a `minute hour * * *` expression.
    pub fn parse_cron(expr: &str) -> Result<Self> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(Error::Schedule(format!(
                "cron '{}' must have 5 fields (minute hour * * *)",
                expr
            )));
        }
        if fields[2..].iter().any(|f| *f != "*") {
            return Err(Error::Schedule(format!(
                "cron '{}': only minute and hour may be restricted",
                expr
            )));
        }

        let minute = parse_cron_field(fields[0], 59, "minute")?;
        let hour = parse_cron_field(fields[1], 23, "hour")?;
        Ok(Self::Cron { minute, hour })
    }

    /// First firing time strictly after `after`.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> DateTime<Tz> {
        match self {
            Self::Interval { minutes } => after.clone() + Duration::minutes(i64::from(*minutes)),
            Self::Cron { minute, hour } => {
                let start = after
                    .with_second(0)
                    .and_then(|t| t.with_nanosecond(0))
                    .unwrap_or_else(|| after.clone());

                (1..=CRON_SEARCH_HORIZON)
                    .map(|offset| start.clone() + Duration::minutes(offset))
                    .find(|t| {
                        minute.map_or(true, |m| t.minute() == m)
                            && hour.map_or(true, |h| t.hour() == h)
                    })
                    .unwrap_or_else(|| after.clone() + Duration::minutes(FALLBACK_MINUTES))
            }
        }
    }

    /// Next firing in local wall-clock time, expressed in UTC.
    #[must_use]
    pub fn next_run_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.next_after(&now.with_timezone(&Local))
            .with_timezone(&Utc)
    }
}

fn parse_cron_field(field: &str, max: u32, what: &str) -> Result<Option<u32>> {
    if field == "*" {
        return Ok(None);
    }
    match field.parse::<u32>() {
        Ok(value) if value <= max => Ok(Some(value)),
        _ => Err(Error::Schedule(format!(
            "invalid cron {} '{}' (expected * or 0-{})",
            what, field, max
        ))),
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interval { minutes } => write!(f, "every {} min", minutes),
            Self::Cron { minute, hour } => {
                let field = |v: &Option<u32>| v.map_or_else(|| "*".to_string(), |v| v.to_string());
                write!(f, "cron {} {} * * *", field(minute), field(hour))
            }
        }
    }
}

/// A scheduled job owned by one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    /// Short job identifier
    pub id: String,
    /// Agent the job belongs to
    pub owner: String,
    /// When it fires
    pub schedule: Schedule,
    /// Task text handed back to the owner
    pub task: String,
    /// Next firing time
    pub next_run: DateTime<Utc>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Chat channel the job was created from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

/// On-disk layout: `[[jobs]]` tables
#[derive(Debug, Default, Serialize, Deserialize)]
struct ScheduleFile {
    #[serde(default)]
    jobs: Vec<ScheduledJob>,
}

/// Job store shared by the schedule tool and the runner
#[derive(Debug, Default)]
pub struct ScheduleStore {
    jobs: Mutex<Vec<ScheduledJob>>,
    path: Option<PathBuf>,
}

impl ScheduleStore {
    /// Create an empty store that lives in memory only
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the store kept in `path`, starting empty when the file is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let jobs = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| storage_error(&path, e))?;
            toml::from_str::<ScheduleFile>(&raw)
                .map_err(|e| storage_error(&path, e))?
                .jobs
        } else {
            Vec::new()
        };
        info!(path = %path.display(), jobs = jobs.len(), "Schedule store opened");
        Ok(Self {
            jobs: Mutex::new(jobs),
            path: Some(path),
        })
    }

    /// File backing the store, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Rewrite the backing file with `jobs`.
    fn save(&self, jobs: &[ScheduledJob]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = ScheduleFile {
            jobs: jobs.to_vec(),
        };
        let raw = toml::to_string_pretty(&file).map_err(|e| storage_error(path, e))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| storage_error(path, e))?;
        }
        let staging = path.with_extension("toml.tmp");
        fs::write(&staging, raw).map_err(|e| storage_error(path, e))?;
        fs::rename(&staging, path).map_err(|e| storage_error(path, e))?;
        debug!(path = %path.display(), jobs = jobs.len(), "Schedule saved");
        Ok(())
    }

    /// Add a job for `owner`, remembering the channel it came from
    pub fn add(
        &self,
        owner: &str,
        schedule: Schedule,
        task: &str,
        channel_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ScheduledJob> {
        let task = task.trim();
        if task.is_empty() {
            return Err(Error::Schedule("task must not be empty".to_string()));
        }

        let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        let job = ScheduledJob {
            id,
            owner: owner.to_string(),
            next_run: schedule.next_run_from(now),
            schedule,
            task: task.to_string(),
            created_at: now,
            channel_id: channel_id.map(str::to_string),
        };

        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        jobs.push(job.clone());
        if let Err(e) = self.save(&jobs) {
            jobs.pop();
            return Err(e);
        }
        info!(job = %job.id, owner, schedule = %job.schedule, "Scheduled job");
        Ok(job)
    }

    /// Jobs owned by `owner`, in creation order
    #[must_use]
    pub fn list(&self, owner: &str) -> Vec<ScheduledJob> {
        self.jobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|j| j.owner == owner)
            .cloned()
            .collect()
    }

    /// Remove one of `owner`'s jobs
    pub fn delete(&self, owner: &str, job_id: &str) -> Result<ScheduledJob> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let index = jobs
            .iter()
            .position(|j| j.owner == owner && j.id == job_id)
            .ok_or_else(|| Error::Schedule(format!("no job '{}' for {}", job_id, owner)))?;
        let job = jobs.remove(index);
        if let Err(e) = self.save(&jobs) {
            jobs.insert(index, job);
            return Err(e);
        }
        Ok(job)
    }

    /// Jobs due at `now`; each returned job's `next_run` is advanced first.
    ///
    /// A failed save is logged and the jobs still fire; the file catches up
    /// on the next successful save.
    pub fn take_due(&self, now: DateTime<Utc>) -> Vec<ScheduledJob> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        let mut due = Vec::new();
        for job in jobs.iter_mut().filter(|j| j.next_run <= now) {
            due.push(job.clone());
            job.next_run = job.schedule.next_run_from(now);
            debug!(job = %job.id, next_run = %job.next_run, "Job fired");
        }
        if !due.is_empty() {
            if let Err(e) = self.save(&jobs) {
                warn!(error = %e, "Failed to save advanced schedule");
            }
        }
        due
    }

    /// Total number of jobs
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the store holds no jobs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn storage_error(path: &Path, error: impl fmt::Display) -> Error {
    Error::Storage {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}
