//! Builder pattern for Worker construction

use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::{DispatchError, DispatchResult};
use crate::request::{RequestEncoder, WorkItem};
use crate::response::OutcomeRecord;
use crate::traits::Transport;

use super::executor::Worker;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

/// Builder for creating Worker instances
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(0)
///     .transport(transport)
///     .items(items, cursor)
///     .outcome_tx(tx)
///     .semaphore(semaphore)
///     .request_timeout(Duration::from_secs(60))
///     .build()?;
/// ```
pub struct WorkerBuilder {
    id: usize,
    transport: Option<Arc<dyn Transport>>,
    encoder: RequestEncoder,
    items: Option<Arc<[WorkItem]>>,
    cursor: Option<Arc<AtomicUsize>>,
    outcome_tx: Option<mpsc::Sender<OutcomeRecord>>,
    semaphore: Option<Arc<Semaphore>>,
    request_timeout: Duration,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            transport: None,
            encoder: RequestEncoder::default(),
            items: None,
            cursor: None,
            outcome_tx: None,
            semaphore: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the request encoder
    pub fn encoder(mut self, encoder: RequestEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Set the shared batch and its claim cursor
    pub fn items(mut self, items: Arc<[WorkItem]>, cursor: Arc<AtomicUsize>) -> Self {
        self.items = Some(items);
        self.cursor = Some(cursor);
        self
    }

    /// Set the outcome channel sender
    pub fn outcome_tx(mut self, tx: mpsc::Sender<OutcomeRecord>) -> Self {
        self.outcome_tx = Some(tx);
        self
    }

    /// Set the shared admission semaphore
    pub fn semaphore(mut self, semaphore: Arc<Semaphore>) -> Self {
        self.semaphore = Some(semaphore);
        self
    }

    /// Set the per-call deadline
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if any required field is missing.
    pub fn build(self) -> DispatchResult<Worker> {
        let transport = self
            .transport
            .ok_or_else(|| DispatchError::missing_config("transport"))?;
        let items = self
            .items
            .ok_or_else(|| DispatchError::missing_config("items"))?;
        let cursor = self
            .cursor
            .ok_or_else(|| DispatchError::missing_config("cursor"))?;
        let outcome_tx = self
            .outcome_tx
            .ok_or_else(|| DispatchError::missing_config("outcome_tx"))?;
        let semaphore = self
            .semaphore
            .ok_or_else(|| DispatchError::missing_config("semaphore"))?;

        Ok(Worker::new(
            self.id,
            transport,
            self.encoder,
            items,
            cursor,
            outcome_tx,
            semaphore,
            self.request_timeout,
        ))
    }
}
