//! A single-worker queue for background operations that must not overlap.
//!
//! Operations run one at a time, in submission order, on a dedicated tokio
//! task. Submitting waits only while the queue is full.

use crate::error::{ErrorKind, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Operations that may wait in the queue before submitters are held up.
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

type Operation = BoxFuture<'static, ()>;

#[derive(Debug, Default)]
struct Counters {
    submitted: AtomicUsize,
    completed: AtomicUsize,
    cancelled: AtomicBool,
}

pub struct OperationQueue {
    sender: mpsc::Sender<Operation>,
    counters: Arc<Counters>,
    worker: JoinHandle<()>,
}
impl OperationQueue {
    /// Start the worker. Must be called from within a tokio runtime.
    pub fn new(depth: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<Operation>(depth.max(1));
        let counters = Arc::new(Counters::default());
        let worker_counters = Arc::clone(&counters);
        let worker = tokio::spawn(async move {
            while let Some(operation) = receiver.recv().await {
                if worker_counters.cancelled.load(Ordering::SeqCst) {
                    debug!("dropping cancelled operation");
                    continue;
                }
                operation.await;
                worker_counters.completed.fetch_add(1, Ordering::SeqCst);
            }
        });
        Self { sender, counters, worker }
    }

    /// Queue an operation behind everything submitted before it.
    ///
    /// # Errors
    /// [`ErrorKind::QueueClosed`] if the worker has stopped.
    pub async fn submit<F>(&self, operation: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(operation.boxed()).await.is_err() {
            self.counters.submitted.fetch_sub(1, Ordering::SeqCst);
            exn::bail!(ErrorKind::QueueClosed);
        }
        Ok(())
    }

    pub fn submitted(&self) -> usize {
        self.counters.submitted.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.counters.completed.load(Ordering::SeqCst)
    }

    /// Completed share of everything submitted, `0.0` when nothing was.
    pub fn progress(&self) -> f64 {
        match self.submitted() {
            0 => 0.0,
            submitted => self.completed() as f64 / submitted as f64,
        }
    }

    /// Drop every operation that has not started yet. The one currently
    /// running, if any, is allowed to finish.
    pub fn cancel_all(&self) {
        self.counters.cancelled.store(true, Ordering::SeqCst);
    }

    /// Accept work again after [`cancel_all`](Self::cancel_all) and zero the
    /// counters.
    pub fn reset(&self) {
        self.counters.cancelled.store(false, Ordering::SeqCst);
        self.counters.submitted.store(0, Ordering::SeqCst);
        self.counters.completed.store(0, Ordering::SeqCst);
    }

    /// Stop accepting work and wait for the queue to drain.
    pub async fn shutdown(self) {
        drop(self.sender);
        if let Err(err) = self.worker.await {
            warn!(error = %err, "operation queue worker stopped abnormally");
        }
    }
}
impl Default for OperationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_DEPTH)
    }
}
