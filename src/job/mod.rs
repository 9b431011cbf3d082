//! Job coordination
//!
//! The coordinator owns one job run: it counts the input's data lines,
//! builds the partition grid, fans one worker task out per partition, waits
//! for all of them, and aggregates step statuses into the terminal job
//! status. Step failures never abort sibling workers; the job completes iff
//! every step completed.

pub mod repository;
pub mod status;

pub use repository::{
    InMemoryJobRepository, JobExecution, JobRepository, JobStatus, StepExecution, StepStatus,
};
pub use status::StatusProjection;

use crate::bulkhead::{PoolBulkhead, SemaphoreBulkhead};
use crate::client::{AccountServiceClient, ConfigServiceClient};
use crate::config::Config;
use crate::partition::partition;
use crate::validator::RecordValidator;
use crate::worker::PartitionWorker;
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Orchestrates one job execution over the configured input file.
///
/// Holds the process-wide validator stack (clients and bulkheads); workers
/// receive shared handles, never copies.
pub struct JobCoordinator {
    config: Arc<Config>,
    repository: Arc<dyn JobRepository>,
    validator: Arc<RecordValidator>,
}

impl JobCoordinator {
    /// Build the validator stack from configuration. Must run inside a
    /// tokio runtime: the pool bulkhead spawns its core workers here.
    pub fn new(config: Arc<Config>, repository: Arc<dyn JobRepository>) -> Result<Self> {
        let request_timeout = config.request_timeout();
        let config_client = Arc::new(
            ConfigServiceClient::new(&config.config_service.base_url, request_timeout)
                .context("Failed to build config service client")?,
        );
        let account_client = Arc::new(
            AccountServiceClient::new(
                &config.account_validation_service.base_url,
                request_timeout,
            )
            .context("Failed to build account validation client")?,
        );
        let config_bulkhead = Arc::new(SemaphoreBulkhead::new(
            "config",
            config.bulkheads.config.max_concurrent_calls,
            config.bulkheads.config.max_wait(),
        ));
        let account_pool = Arc::new(PoolBulkhead::new(
            "account-validation",
            &config.bulkheads.pool,
        ));
        let validator = Arc::new(RecordValidator::new(
            config_client,
            account_client,
            config_bulkhead,
            account_pool,
        ));

        Ok(Self {
            config,
            repository,
            validator,
        })
    }

    /// Run one job to its terminal state and return the final row.
    pub async fn run(&self, job_name: &str) -> Result<JobExecution> {
        let job = self.repository.create_job(job_name);
        info!(job_id = job.id, job_name, "job starting");

        let all_completed = match self.execute(job.id).await {
            Ok(all_completed) => all_completed,
            Err(err) => {
                error!(job_id = job.id, error = %err, "job aborted");
                false
            }
        };

        let status = if all_completed {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        };
        self.repository.set_job_status(job.id, status);
        info!(job_id = job.id, %status, "job finished");

        self.repository
            .get_job(job.id)
            .with_context(|| format!("Job {} missing from repository", job.id))
    }

    async fn execute(&self, job_id: u64) -> Result<bool> {
        let total_rows = count_data_rows(&self.config.input_file)?;
        let partitions = partition(total_rows, self.config.grid_size);
        info!(
            job_id,
            total_rows,
            partitions = partitions.len(),
            input = %self.config.input_file.display(),
            "input partitioned"
        );

        self.repository.set_job_status(job_id, JobStatus::Started);

        let mut handles = Vec::with_capacity(partitions.len());
        for descriptor in partitions {
            self.repository.add_step(job_id, &descriptor.step_name());
            let worker = PartitionWorker::new(
                descriptor,
                Arc::clone(&self.config),
                Arc::clone(&self.validator),
                Arc::clone(&self.repository),
                job_id,
            );
            handles.push(tokio::spawn(worker.run()));
        }

        let mut all_completed = true;
        for handle in handles {
            match handle.await {
                Ok(StepStatus::Completed) => {}
                Ok(_) => all_completed = false,
                Err(err) => {
                    error!(job_id, error = %err, "worker task died");
                    all_completed = false;
                }
            }
        }
        Ok(all_completed)
    }
}

/// Count data rows: total lines minus the header. An empty file has zero
/// data rows, as does a file holding only the header.
pub fn count_data_rows(path: &Path) -> Result<u64> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut total_lines: u64 = 0;
    for line in reader.lines() {
        line.with_context(|| format!("Failed to read input file {}", path.display()))?;
        total_lines += 1;
    }
    Ok(total_lines.saturating_sub(1))
}
