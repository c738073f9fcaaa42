//! Worker execution loop

use crate::error::{DispatchError, DispatchResult};
use crate::request::{RequestEncoder, RequestPayload, WorkItem};
use crate::response::{Outcome, OutcomeRecord};
use crate::traits::Transport;

use super::stats::WorkerStats;

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};

/// Worker processes items in a loop: claim -> encode -> send -> report -> repeat
///
/// Workers are tokio tasks managed by the Orchestrator. They share the item
/// batch, a claim cursor and the transport via Arc, and send one record per
/// claimed item through an mpsc channel.
pub struct Worker {
    /// Unique worker identifier
    id: usize,

    /// Transport (shared across workers via Arc)
    transport: Arc<dyn Transport>,

    /// Request encoder
    encoder: RequestEncoder,

    /// The full batch (shared, read-only)
    items: Arc<[WorkItem]>,

    /// Index of the next unclaimed item
    cursor: Arc<AtomicUsize>,

    /// Channel sender for outcome records
    outcome_tx: mpsc::Sender<OutcomeRecord>,

    /// Admission bound (shared semaphore)
    semaphore: Arc<Semaphore>,

    /// Deadline applied around every transport call
    request_timeout: Duration,
}

impl Worker {
    /// Create a new worker
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        transport: Arc<dyn Transport>,
        encoder: RequestEncoder,
        items: Arc<[WorkItem]>,
        cursor: Arc<AtomicUsize>,
        outcome_tx: mpsc::Sender<OutcomeRecord>,
        semaphore: Arc<Semaphore>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            id,
            transport,
            encoder,
            items,
            cursor,
            outcome_tx,
            semaphore,
            request_timeout,
        }
    }

    /// Run the worker loop
    ///
    /// Returns WorkerStats once no unclaimed items remain or the outcome
    /// channel closes.
    pub async fn run(self) -> DispatchResult<WorkerStats> {
        let mut stats = WorkerStats::new(self.id);
        stats.start();

        tracing::debug!(worker_id = self.id, "Worker started");

        while let Some(index) = self.try_claim_item() {
            let record = self.execute_one(index).await?;
            stats.record(
                record.outcome.kind(),
                Duration::from_secs_f64(record.latency_ms / 1000.0),
            );

            if record.outcome.is_error() {
                tracing::warn!(
                    worker_id = self.id,
                    item = %record.item,
                    kind = %record.outcome.kind(),
                    "Item failed"
                );
            }

            if self.outcome_tx.send(record).await.is_err() {
                tracing::debug!(
                    worker_id = self.id,
                    "Outcome channel closed, worker stopping"
                );
                break;
            }
        }

        stats.stop();
        tracing::debug!(
            worker_id = self.id,
            succeeded = stats.succeeded(),
            failed = stats.failed(),
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "Worker finished"
        );

        Ok(stats)
    }

    /// Process a single claimed item
    async fn execute_one(&self, index: usize) -> DispatchResult<OutcomeRecord> {
        let item = self
            .items
            .get(index)
            .ok_or_else(|| DispatchError::worker(format!("claimed index {} out of range", index)))?;

        // 1. Acquire admission permit
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| DispatchError::shutdown())?;

        // 2. Encode, then send under the per-call deadline
        let start = Instant::now();
        let (id, outcome) = match self.encoder.encode(item).await {
            Ok(payload) => {
                let id = payload.id;
                (Some(id), self.send(payload).await)
            }
            Err(e) => (
                None,
                Outcome::EncodingError {
                    cause: e.to_string(),
                },
            ),
        };
        let latency = start.elapsed();

        // 3. Build and return the record
        Ok(OutcomeRecord {
            index,
            item: item.clone(),
            id,
            outcome,
            worker_id: Some(self.id),
            latency_ms: latency.as_secs_f64() * 1000.0,
            completed_at: chrono::Utc::now(),
        })
    }

    /// One transport call under the per-call deadline
    ///
    /// A panicking transport is caught here so the worker keeps draining the
    /// batch.
    async fn send(&self, payload: RequestPayload) -> Outcome {
        let call = AssertUnwindSafe(self.transport.send(payload)).catch_unwind();
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(panic)) => {
                let cause = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic payload".to_string());
                tracing::error!(worker_id = self.id, cause = %cause, "Transport panicked");
                Outcome::UnexpectedError {
                    cause: format!("transport panicked: {}", cause),
                }
            }
            Err(_) => Outcome::TimeoutError {
                cause: format!("no response within {:?}", self.request_timeout),
            },
        }
    }

    /// Claim the next item from the shared cursor
    ///
    /// Returns `None` once every item has been claimed. Each index is handed
    /// out to exactly one worker.
    fn try_claim_item(&self) -> Option<usize> {
        let claimed = self.cursor.fetch_add(1, Ordering::SeqCst);
        if claimed >= self.items.len() {
            // Over-claimed near the end; keep the cursor at the batch size.
            self.cursor.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        Some(claimed)
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("transport", &self.transport.name())
            .field("encoder", &self.encoder)
            .field("items", &self.items.len())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
