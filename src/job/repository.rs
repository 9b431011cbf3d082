//! Job and step execution bookkeeping
//!
//! Durable record of job runs and their per-partition steps with progress
//! counters. The coordinator writes the job row; each worker writes its own
//! step row. Writes to a row serialise through the repository lock.
//!
//! The in-memory implementation backs the CLI and tests; a durable store
//! can be swapped in behind the same trait.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Starting,
    Started,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Starting => "STARTING",
            JobStatus::Started => "STARTED",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Started,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StepStatus::Started => "STARTED",
            StepStatus::Completed => "COMPLETED",
            StepStatus::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

/// One partition worker's execution. Counters only ever grow.
#[derive(Debug, Clone, Serialize)]
pub struct StepExecution {
    pub name: String,
    pub status: StepStatus,
    pub read_count: u64,
    pub write_count: u64,
    pub skip_count: u64,
    pub filter_count: u64,
    pub start_ts: DateTime<Utc>,
    pub end_ts: Option<DateTime<Utc>>,
}

/// One job run: the reporting envelope over its steps.
#[derive(Debug, Clone, Serialize)]
pub struct JobExecution {
    pub id: u64,
    pub job_name: String,
    pub status: JobStatus,
    pub start_ts: DateTime<Utc>,
    pub end_ts: Option<DateTime<Utc>>,
    pub step_executions: Vec<StepExecution>,
}

pub trait JobRepository: Send + Sync {
    /// Create a job in the `Starting` state and return its row
    fn create_job(&self, job_name: &str) -> JobExecution;

    /// Transition a job; terminal transitions stamp `end_ts`
    fn set_job_status(&self, job_id: u64, status: JobStatus);

    /// Register a step in the `Started` state
    fn add_step(&self, job_id: u64, step_name: &str);

    /// Fold one processed chunk into a step's counters
    fn record_chunk(
        &self,
        job_id: u64,
        step_name: &str,
        read: u64,
        written: u64,
        skipped: u64,
        filtered: u64,
    );

    /// Transition a step to a terminal state, stamping `end_ts`
    fn complete_step(&self, job_id: u64, step_name: &str, status: StepStatus);

    fn get_job(&self, job_id: u64) -> Option<JobExecution>;
}

/// Process-local repository: a locked map of job rows.
pub struct InMemoryJobRepository {
    next_id: AtomicU64,
    jobs: RwLock<HashMap<u64, JobExecution>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// The most recently created job, if any
    pub fn latest_job(&self) -> Option<JobExecution> {
        let jobs = self.jobs.read().expect("job repository lock poisoned");
        jobs.values().max_by_key(|job| job.id).cloned()
    }

    fn with_step(&self, job_id: u64, step_name: &str, update: impl FnOnce(&mut StepExecution)) {
        let mut jobs = self.jobs.write().expect("job repository lock poisoned");
        if let Some(job) = jobs.get_mut(&job_id) {
            if let Some(step) = job
                .step_executions
                .iter_mut()
                .find(|step| step.name == step_name)
            {
                update(step);
            }
        }
    }
}

impl Default for InMemoryJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRepository for InMemoryJobRepository {
    fn create_job(&self, job_name: &str) -> JobExecution {
        let job = JobExecution {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            job_name: job_name.to_string(),
            status: JobStatus::Starting,
            start_ts: Utc::now(),
            end_ts: None,
            step_executions: Vec::new(),
        };
        let mut jobs = self.jobs.write().expect("job repository lock poisoned");
        jobs.insert(job.id, job.clone());
        job
    }

    fn set_job_status(&self, job_id: u64, status: JobStatus) {
        let mut jobs = self.jobs.write().expect("job repository lock poisoned");
        if let Some(job) = jobs.get_mut(&job_id) {
            job.status = status;
            if status.is_terminal() {
                job.end_ts = Some(Utc::now());
            }
        }
    }

    fn add_step(&self, job_id: u64, step_name: &str) {
        let mut jobs = self.jobs.write().expect("job repository lock poisoned");
        if let Some(job) = jobs.get_mut(&job_id) {
            job.step_executions.push(StepExecution {
                name: step_name.to_string(),
                status: StepStatus::Started,
                read_count: 0,
                write_count: 0,
                skip_count: 0,
                filter_count: 0,
                start_ts: Utc::now(),
                end_ts: None,
            });
        }
    }

    fn record_chunk(
        &self,
        job_id: u64,
        step_name: &str,
        read: u64,
        written: u64,
        skipped: u64,
        filtered: u64,
    ) {
        self.with_step(job_id, step_name, |step| {
            step.read_count += read;
            step.write_count += written;
            step.skip_count += skipped;
            step.filter_count += filtered;
        });
    }

    fn complete_step(&self, job_id: u64, step_name: &str, status: StepStatus) {
        self.with_step(job_id, step_name, |step| {
            step.status = status;
            step.end_ts = Some(Utc::now());
        });
    }

    fn get_job(&self, job_id: u64) -> Option<JobExecution> {
        let jobs = self.jobs.read().expect("job repository lock poisoned");
        jobs.get(&job_id).cloned()
    }
}
