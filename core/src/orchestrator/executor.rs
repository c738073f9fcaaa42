//! Orchestrator execution logic

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Semaphore};

use crate::channel::ChannelConfig;
use crate::config::DispatchConfig;
use crate::error::DispatchResult;
use crate::metrics::RunStatistics;
use crate::request::{RequestEncoder, WorkItem};
use crate::response::{Outcome, OutcomeRecord};
use crate::traits::{OutcomeObserver, Transport, WorkSource};
use crate::worker::{WorkerBuilder, WorkerStats};

use super::aggregator::aggregate_outcomes;

/// Everything collected from one dispatch
#[derive(Debug, Clone)]
pub struct DispatchRun {
    /// One record per item, ordered by item index
    pub records: Vec<OutcomeRecord>,

    /// When dispatch started
    pub started_at: DateTime<Utc>,

    /// When the completion barrier was passed
    pub finished_at: DateTime<Utc>,

    /// Monotonic wall-clock time between the two
    pub elapsed: Duration,

    /// Stats from every worker that exited cleanly
    pub workers: Vec<WorkerStats>,
}

impl DispatchRun {
    /// Aggregate the run into summary statistics
    pub fn statistics(&self) -> RunStatistics {
        aggregate_outcomes(&self.records, self.elapsed)
    }

    /// Number of items dispatched
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch was empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Orchestrator is the dispatch engine
///
/// Responsible for spawning the bounded worker pool, collecting exactly one
/// outcome per item, and blocking until the whole batch is done.
pub struct Orchestrator {
    /// Dispatch configuration
    pub(crate) config: DispatchConfig,

    /// Transport (shared across workers)
    pub(crate) transport: Arc<dyn Transport>,

    /// Work source
    pub(crate) source: Arc<dyn WorkSource>,

    /// Request encoder (copied into each worker)
    pub(crate) encoder: RequestEncoder,

    /// Optional per-record hook
    pub(crate) observer: Option<Arc<dyn OutcomeObserver>>,

    /// Outcome channel sizing
    pub(crate) channel_config: ChannelConfig,
}

impl Orchestrator {
    /// Create a new orchestrator
    ///
    /// Use `OrchestratorBuilder` for validated construction.
    pub fn new(
        config: DispatchConfig,
        transport: Arc<dyn Transport>,
        source: Arc<dyn WorkSource>,
        encoder: RequestEncoder,
    ) -> Self {
        Self {
            config,
            transport,
            source,
            encoder,
            observer: None,
            channel_config: ChannelConfig::default(),
        }
    }

    /// Get the dispatch configuration
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Enumerate the work source and dispatch every item
    ///
    /// An unreadable source fails before anything is sent.
    pub async fn run(&self) -> DispatchResult<DispatchRun> {
        let items = self.source.enumerate()?;
        tracing::info!(
            source = self.source.name(),
            items = items.len(),
            "Enumerated work items"
        );
        self.dispatch(items).await
    }

    /// Dispatch a batch and wait until every item has an outcome
    ///
    /// Per-item failures are recorded, never returned; an `Err` here means
    /// the pool itself could not be set up.
    pub async fn dispatch(&self, items: Vec<WorkItem>) -> DispatchResult<DispatchRun> {
        let started_at = Utc::now();
        let start = Instant::now();

        let total = items.len();
        let items: Arc<[WorkItem]> = items.into();
        let semaphore = Arc::new(Semaphore::new(self.config.num_workers));
        let cursor = Arc::new(AtomicUsize::new(0));
        let (outcome_tx, mut outcome_rx) = mpsc::channel(self.channel_config.outcome_buffer);

        // Spawning more workers than items would only add idle tasks.
        let pool_size = self.config.num_workers.min(total);

        tracing::info!(
            num_workers = self.config.num_workers,
            items = total,
            transport = self.transport.name(),
            endpoint = self.transport.endpoint(),
            identity = %self.encoder.identity(),
            request_timeout = ?self.config.request_timeout,
            "Starting dispatch"
        );

        let mut handles = Vec::with_capacity(pool_size);
        for worker_id in 0..pool_size {
            let worker = WorkerBuilder::new(worker_id)
                .transport(Arc::clone(&self.transport))
                .encoder(self.encoder)
                .items(Arc::clone(&items), Arc::clone(&cursor))
                .outcome_tx(outcome_tx.clone())
                .semaphore(Arc::clone(&semaphore))
                .request_timeout(self.config.request_timeout)
                .build()?;

            handles.push(tokio::spawn(worker.run()));
        }

        // Workers now hold the only senders; recv() ends once they all exit.
        drop(outcome_tx);

        let mut slots: Vec<Option<OutcomeRecord>> = (0..total).map(|_| None).collect();
        while let Some(record) = outcome_rx.recv().await {
            self.collect(&mut slots, record);
        }

        // Completion barrier
        let mut workers = Vec::with_capacity(handles.len());
        for (idx, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(stats)) => {
                    tracing::debug!(
                        worker_id = idx,
                        succeeded = stats.succeeded(),
                        failed = stats.failed(),
                        utilization = stats.utilization(),
                        "Worker completed"
                    );
                    workers.push(stats);
                }
                Ok(Err(e)) => {
                    tracing::error!(worker_id = idx, error = %e, "Worker returned error");
                }
                Err(e) => {
                    tracing::error!(worker_id = idx, error = %e, "Worker task panicked");
                }
            }
        }

        let records = self.fill_missing(&items, slots);

        let elapsed = start.elapsed();
        let run = DispatchRun {
            records,
            started_at,
            finished_at: Utc::now(),
            elapsed,
            workers,
        };

        let stats = run.statistics();
        tracing::info!(
            elapsed_secs = elapsed.as_secs_f64(),
            total_items = stats.total_items,
            succeeded = stats.succeeded,
            failed = stats.failed,
            "Dispatch completed"
        );

        Ok(run)
    }

    /// Place a record in its slot, rejecting duplicates
    fn collect(&self, slots: &mut [Option<OutcomeRecord>], record: OutcomeRecord) {
        match slots.get_mut(record.index) {
            Some(slot) if slot.is_none() => {
                self.notify(&record);
                *slot = Some(record);
            }
            _ => {
                tracing::error!(
                    index = record.index,
                    item = %record.item,
                    "Discarding duplicate or out-of-range outcome"
                );
            }
        }
    }

    /// Turn the slots into records, backfilling any item nobody reported
    ///
    /// An item whose worker died mid-flight still gets its one outcome.
    pub(super) fn fill_missing(
        &self,
        items: &[WorkItem],
        slots: Vec<Option<OutcomeRecord>>,
    ) -> Vec<OutcomeRecord> {
        slots
            .into_iter()
            .zip(items)
            .enumerate()
            .map(|(index, (slot, item))| match slot {
                Some(record) => record,
                None => {
                    let record = OutcomeRecord {
                        index,
                        item: item.clone(),
                        id: None,
                        outcome: Outcome::UnexpectedError {
                            cause: "worker exited before reporting an outcome".to_string(),
                        },
                        worker_id: None,
                        latency_ms: 0.0,
                        completed_at: Utc::now(),
                    };
                    tracing::warn!(item = %record.item, "No outcome reported for item");
                    self.notify(&record);
                    record
                }
            })
            .collect()
    }

    fn notify(&self, record: &OutcomeRecord) {
        if let Some(observer) = &self.observer {
            observer.on_outcome(record);
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("transport", &self.transport.name())
            .field("endpoint", &self.transport.endpoint())
            .field("source", &self.source.name())
            .field("encoder", &self.encoder)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
