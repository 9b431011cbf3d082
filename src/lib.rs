//! txnvalidator - Parallel transaction file validation pipeline
//!
//! txnvalidator validates large delimited transaction files against two
//! external services and splits the records into per-partition valid and
//! invalid output files.
//!
//! # Architecture
//!
//! - **Range partitioning**: the input file is split into contiguous line
//!   ranges, one per worker
//! - **Chunked workers**: each partition is read, validated, and written in
//!   bounded chunks on its own task
//! - **Bulkhead isolation**: config lookups run under a bounded semaphore,
//!   account validation under a dedicated bounded worker pool
//! - **Dual-sink output**: valid and invalid records stream to separate
//!   per-partition CSV files
//! - **Job bookkeeping**: job and step executions carry observable progress
//!   counters for external polling

pub mod bulkhead;
pub mod client;
pub mod config;
pub mod job;
pub mod output;
pub mod partition;
pub mod reader;
pub mod record;
pub mod util;
pub mod validator;
pub mod worker;

#[cfg(test)]
pub(crate) mod testsupport;

// Re-export commonly used types
pub use config::Config;
pub use record::TransactionRecord;

/// Result type used throughout txnvalidator
pub type Result<T> = anyhow::Result<T>;
