//! Semaphore bulkhead
//!
//! Bounded-permit admission for fast inline downstream calls. `acquire`
//! waits at most `max_wait` for one of `max_concurrent_calls` permits and
//! reports `Full` when none frees up in time. Permits release on drop, so a
//! panicking or erroring call cannot leak one.

use crate::bulkhead::BulkheadError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;
use tracing::debug;

/// Process-wide permit counter shared by every caller of a named bulkhead.
pub struct SemaphoreBulkhead {
    name: String,
    permits: Arc<Semaphore>,
    max_wait: Duration,
}

impl SemaphoreBulkhead {
    pub fn new(name: impl Into<String>, max_concurrent_calls: usize, max_wait: Duration) -> Self {
        Self {
            name: name.into(),
            permits: Arc::new(Semaphore::new(max_concurrent_calls)),
            max_wait,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Permits not currently held
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait up to `max_wait` for a permit. The permit is released when the
    /// returned guard drops.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, BulkheadError> {
        match timeout(self.max_wait, Arc::clone(&self.permits).acquire_owned()).await {
            Ok(Ok(permit)) => Ok(permit),
            // The semaphore is never closed while the bulkhead lives
            Ok(Err(_)) => Err(BulkheadError::Interrupted),
            Err(_) => {
                debug!(bulkhead = %self.name, "permit wait timed out");
                Err(BulkheadError::Full)
            }
        }
    }

    /// Run `call` while holding a permit.
    ///
    /// The permit spans exactly the call; do not use this to hand work to
    /// another executor, or the permit would be held across that queue's
    /// wait as well.
    pub async fn with_permit<F, T>(&self, call: F) -> Result<T, BulkheadError>
    where
        F: Future<Output = T>,
    {
        let _permit = self.acquire().await?;
        Ok(call.await)
    }
}
