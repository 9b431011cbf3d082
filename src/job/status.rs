//! Status projection
//!
//! Read-only rendering of a job execution for external polling: the job
//! envelope, aggregate counters across all partitions, and one row per
//! partition sorted by name. Serializable for programmatic consumers and
//! renderable as text for the CLI.

use crate::job::repository::{JobExecution, JobStatus, StepStatus};
use crate::util::time::format_duration;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct StatusProjection {
    pub job_id: u64,
    pub job_name: String,
    pub status: JobStatus,
    pub start_ts: DateTime<Utc>,
    pub end_ts: Option<DateTime<Utc>>,
    pub elapsed_ms: u64,
    pub aggregate: AggregateStatus,
    pub partitions: Vec<PartitionStatus>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateStatus {
    pub total_partitions: usize,
    pub completed: usize,
    pub running: usize,
    pub failed: usize,
    pub total_read: u64,
    pub total_written: u64,
    pub total_skipped: u64,
    pub total_filtered: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartitionStatus {
    pub name: String,
    pub status: StepStatus,
    pub read: u64,
    pub write: u64,
    pub skip: u64,
    pub filter: u64,
    pub start_ts: DateTime<Utc>,
    pub end_ts: Option<DateTime<Utc>>,
}

impl StatusProjection {
    pub fn from_job(job: &JobExecution) -> Self {
        let mut aggregate = AggregateStatus {
            total_partitions: job.step_executions.len(),
            ..AggregateStatus::default()
        };

        let mut partitions: Vec<PartitionStatus> = job
            .step_executions
            .iter()
            .map(|step| {
                match step.status {
                    StepStatus::Completed => aggregate.completed += 1,
                    StepStatus::Failed => aggregate.failed += 1,
                    StepStatus::Started => aggregate.running += 1,
                }
                aggregate.total_read += step.read_count;
                aggregate.total_written += step.write_count;
                aggregate.total_skipped += step.skip_count;
                aggregate.total_filtered += step.filter_count;
                PartitionStatus {
                    name: step.name.clone(),
                    status: step.status,
                    read: step.read_count,
                    write: step.write_count,
                    skip: step.skip_count,
                    filter: step.filter_count,
                    start_ts: step.start_ts,
                    end_ts: step.end_ts,
                }
            })
            .collect();
        partitions.sort_by(|a, b| a.name.cmp(&b.name));

        let elapsed_end = job.end_ts.unwrap_or_else(Utc::now);
        let elapsed_ms = (elapsed_end - job.start_ts).num_milliseconds().max(0) as u64;

        Self {
            job_id: job.id,
            job_name: job.job_name.clone(),
            status: job.status,
            start_ts: job.start_ts,
            end_ts: job.end_ts,
            elapsed_ms,
            aggregate,
            partitions,
        }
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    /// One-line form for periodic progress output while the job runs
    pub fn render_progress_line(&self) -> String {
        format!(
            "[{}] {} - partitions {}/{} done ({} running, {} failed) - read {}, written {}, skipped {}",
            format_duration(self.elapsed()),
            self.status,
            self.aggregate.completed,
            self.aggregate.total_partitions,
            self.aggregate.running,
            self.aggregate.failed,
            self.aggregate.total_read,
            self.aggregate.total_written,
            self.aggregate.total_skipped,
        )
    }

    /// Multi-line form for the final CLI report
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "═══════════════════════════════════════════════════════════");
        let _ = writeln!(out, "                       JOB STATUS");
        let _ = writeln!(out, "═══════════════════════════════════════════════════════════");
        let _ = writeln!(out);
        let _ = writeln!(out, "Job:     {} (#{}) - {}", self.job_name, self.job_id, self.status);
        let _ = writeln!(out, "Started: {}", self.start_ts.to_rfc3339());
        if let Some(end_ts) = self.end_ts {
            let _ = writeln!(out, "Ended:   {}", end_ts.to_rfc3339());
        }
        let _ = writeln!(out, "Elapsed: {}", format_duration(self.elapsed()));
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Partitions: {} total, {} completed, {} running, {} failed",
            self.aggregate.total_partitions,
            self.aggregate.completed,
            self.aggregate.running,
            self.aggregate.failed,
        );
        let _ = writeln!(
            out,
            "Records:    read {}, written {}, skipped {}, filtered {}",
            self.aggregate.total_read,
            self.aggregate.total_written,
            self.aggregate.total_skipped,
            self.aggregate.total_filtered,
        );
        if !self.partitions.is_empty() {
            let _ = writeln!(out);
            for partition in &self.partitions {
                let _ = writeln!(
                    out,
                    "  {:<16} {:<10} read {:>6}  written {:>6}  skipped {:>4}  filtered {:>4}",
                    partition.name,
                    partition.status.to_string(),
                    partition.read,
                    partition.write,
                    partition.skip,
                    partition.filter,
                );
            }
        }
        let _ = writeln!(out);
        let _ = write!(out, "═══════════════════════════════════════════════════════════");
        out
    }
}
