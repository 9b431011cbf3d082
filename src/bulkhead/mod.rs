//! Bulkhead primitives
//!
//! Both downstream dependencies sit behind a bulkhead: a concurrency limit
//! that fails fast when saturated instead of queueing unboundedly. Two
//! regimes are provided:
//!
//! - **Semaphore bulkhead**: a bounded permit counter with a bounded wait.
//!   The caller runs the protected call inline on its own task. Sized for
//!   fast calls; holding a permit while parked on another executor's queue
//!   would multiply permit pressure, so permits must only span the call
//!   itself.
//! - **Pool bulkhead**: a dedicated worker pool with a bounded queue.
//!   Submission hands the task off and returns a joinable future, so the
//!   caller's task stays free for other work while the slow call runs.

pub mod pool;
pub mod semaphore;

pub use pool::{PoolBulkhead, PoolFuture};
pub use semaphore::SemaphoreBulkhead;

use thiserror::Error;

/// Failure modes a bulkhead can surface to its caller.
///
/// Downstream errors never appear here; the clients fold those into
/// negative results before the bulkhead boundary is crossed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BulkheadError {
    /// No permit or queue slot became available within the configured bound
    #[error("bulkhead full")]
    Full,
    /// The task was cancelled or its executor went away before completion
    #[error("bulkhead task interrupted")]
    Interrupted,
}
