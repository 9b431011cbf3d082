//! Pool bulkhead
//!
//! A dedicated worker pool with a bounded submission queue. Unlike the
//! semaphore bulkhead, callers do not run the protected call themselves:
//! `submit` hands the task to the pool and returns a [`PoolFuture`] that can
//! be joined later, from any task, without deadlock.
//!
//! # Submission policy
//!
//! - an idle worker picks the task up immediately;
//! - otherwise the task waits in the bounded queue;
//! - a full queue rejects the submission with [`BulkheadError::Full`].
//!
//! # Pool sizing
//!
//! `core_pool_size` workers are spawned up front and live for the pool's
//! lifetime. When a submission lands while every live worker is busy, an
//! overflow worker is spawned up to `max_pool_size`; overflow workers exit
//! after `keep_alive_duration` without work.
//!
//! # Cancellation
//!
//! Dropping a [`PoolFuture`] cancels the task: a queued task is discarded
//! when a worker picks it up, a running task is stopped at its next await
//! point, and any result produced after cancellation is discarded.

use crate::bulkhead::BulkheadError;
use crate::config::PoolBulkheadConfig;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::debug;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Bounded executor guarding one slow downstream dependency.
pub struct PoolBulkhead {
    name: String,
    queue: mpsc::Sender<Job>,
    shared: Arc<PoolShared>,
}

struct PoolShared {
    receiver: Mutex<mpsc::Receiver<Job>>,
    live_workers: AtomicUsize,
    busy_workers: AtomicUsize,
    max_pool_size: usize,
    keep_alive: Duration,
}

impl PoolBulkhead {
    pub fn new(name: impl Into<String>, config: &PoolBulkheadConfig) -> Self {
        let (queue, receiver) = mpsc::channel(config.queue_capacity);
        let shared = Arc::new(PoolShared {
            receiver: Mutex::new(receiver),
            live_workers: AtomicUsize::new(0),
            busy_workers: AtomicUsize::new(0),
            max_pool_size: config.max_pool_size,
            keep_alive: config.keep_alive(),
        });

        let pool = Self {
            name: name.into(),
            queue,
            shared,
        };
        for _ in 0..config.core_pool_size {
            pool.spawn_worker(true);
        }
        pool
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Workers currently alive (core plus overflow)
    pub fn live_workers(&self) -> usize {
        self.shared.live_workers.load(Ordering::SeqCst)
    }

    /// Submit a task for execution on the pool.
    ///
    /// Returns immediately: either a [`PoolFuture`] resolving to the task's
    /// output, or [`BulkheadError::Full`] when the queue cannot take the
    /// task. `submit` itself never waits.
    pub fn submit<F, T>(&self, task: F) -> Result<PoolFuture<T>, BulkheadError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        let job: Job = Box::pin(async move {
            tokio::select! {
                _ = cancel_rx => {}
                output = task => {
                    // Receiver may be gone; the result is then discarded
                    let _ = done_tx.send(output);
                }
            }
        });

        match self.queue.try_send(job) {
            Ok(()) => {
                self.maybe_grow();
                Ok(PoolFuture {
                    result: done_rx,
                    cancel: Some(cancel_tx),
                })
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(bulkhead = %self.name, "queue full, rejecting submission");
                Err(BulkheadError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(BulkheadError::Interrupted),
        }
    }

    /// Spawn an overflow worker when every live worker is busy and the pool
    /// has headroom. Best effort: the counters race against job completion,
    /// which can at worst spawn an overflow worker that times out idle.
    fn maybe_grow(&self) {
        let live = self.shared.live_workers.load(Ordering::SeqCst);
        let busy = self.shared.busy_workers.load(Ordering::SeqCst);
        if busy >= live && live < self.shared.max_pool_size {
            debug!(bulkhead = %self.name, live, "growing pool");
            self.spawn_worker(false);
        }
    }

    fn spawn_worker(&self, core: bool) {
        let shared = Arc::clone(&self.shared);
        shared.live_workers.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            loop {
                let job = if core {
                    let mut receiver = shared.receiver.lock().await;
                    receiver.recv().await
                } else {
                    let recv = async {
                        let mut receiver = shared.receiver.lock().await;
                        receiver.recv().await
                    };
                    match tokio::time::timeout(shared.keep_alive, recv).await {
                        Ok(job) => job,
                        // Idle past keep-alive: shrink back toward core size
                        Err(_) => None,
                    }
                };
                let Some(job) = job else { break };

                shared.busy_workers.fetch_add(1, Ordering::SeqCst);
                job.await;
                shared.busy_workers.fetch_sub(1, Ordering::SeqCst);
            }
            shared.live_workers.fetch_sub(1, Ordering::SeqCst);
        });
    }
}

/// Completion cell for a submitted task.
///
/// `join` consumes the future and resolves with the task's output, or with
/// [`BulkheadError::Interrupted`] when the pool went away before the task
/// produced a result. Dropping the future cancels the task best-effort.
#[derive(Debug)]
pub struct PoolFuture<T> {
    result: oneshot::Receiver<T>,
    cancel: Option<oneshot::Sender<()>>,
}

impl<T> PoolFuture<T> {
    pub async fn join(mut self) -> Result<T, BulkheadError> {
        match (&mut self.result).await {
            Ok(output) => Ok(output),
            Err(_) => Err(BulkheadError::Interrupted),
        }
    }
}

impl<T> Drop for PoolFuture<T> {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}
