//! Partition worker
//!
//! The core execution unit: one worker owns one partition and drives the
//! read -> validate -> write loop over it in bounded chunks. Workers run
//! concurrently on independent tasks; within a worker, records are
//! processed strictly one at a time (each record's checks finish before the
//! next record starts).
//!
//! # Lifecycle
//!
//! 1. open the partition reader and the dual-sink writer
//! 2. loop: read up to `chunk_size` records, validate each, write the chunk,
//!    fold counters into the step row
//! 3. close the writer and mark the step completed
//!
//! Reader or writer IO failure marks only this step failed; partial output
//! files remain and sibling partitions keep running. Interruption finishes
//! the records validated so far, writes them, then fails the step.

use crate::config::Config;
use crate::job::{JobRepository, StepStatus};
use crate::output::DualSinkWriter;
use crate::partition::Partition;
use crate::reader::PartitionReader;
use crate::validator::{RecordValidator, ValidationOutcome};
use crate::Result;
use std::sync::Arc;
use tracing::{error, info};

pub struct PartitionWorker {
    descriptor: Partition,
    config: Arc<Config>,
    validator: Arc<RecordValidator>,
    repository: Arc<dyn JobRepository>,
    job_id: u64,
}

impl PartitionWorker {
    pub fn new(
        descriptor: Partition,
        config: Arc<Config>,
        validator: Arc<RecordValidator>,
        repository: Arc<dyn JobRepository>,
        job_id: u64,
    ) -> Self {
        Self {
            descriptor,
            config,
            validator,
            repository,
            job_id,
        }
    }

    /// Process the whole partition and report the terminal step status.
    pub async fn run(self) -> StepStatus {
        let step_name = self.descriptor.step_name();
        let status = match self.process(&step_name).await {
            Ok(()) => StepStatus::Completed,
            Err(err) => {
                error!(step = %step_name, error = %err, "step failed");
                StepStatus::Failed
            }
        };
        self.repository.complete_step(self.job_id, &step_name, status);
        status
    }

    async fn process(&self, step_name: &str) -> Result<()> {
        let mut reader = PartitionReader::open(&self.config.input_file, &self.descriptor)?;
        let mut writer = DualSinkWriter::open(&self.config.output_dir(), self.descriptor.index)?;

        loop {
            let chunk = match reader.read_chunk(self.config.chunk_size) {
                Ok(chunk) => chunk,
                Err(err) => {
                    let _ = writer.close();
                    return Err(err.into());
                }
            };
            if chunk.is_empty() {
                break;
            }

            let mut records = chunk.records;
            let mut interrupted = false;
            let mut processed = records.len();
            for (position, record) in records.iter_mut().enumerate() {
                match self.validator.validate(record).await {
                    ValidationOutcome::Completed => {}
                    ValidationOutcome::Interrupted => {
                        interrupted = true;
                        processed = position + 1;
                        break;
                    }
                }
            }
            let read = records.len() as u64;
            records.truncate(processed);

            if let Err(err) = writer.write(&records) {
                let _ = writer.close();
                return Err(err);
            }
            self.repository.record_chunk(
                self.job_id,
                step_name,
                read,
                records.len() as u64,
                chunk.skipped,
                0,
            );

            if interrupted {
                let _ = writer.close();
                anyhow::bail!("validation interrupted");
            }
        }

        let (valid_count, invalid_count) = writer.close()?;
        info!(
            step = %step_name,
            valid = valid_count,
            invalid = invalid_count,
            "partition complete"
        );
        Ok(())
    }
}
