//! Core traits for transports, work sources and outcome observers
//!
//! These traits are defined in core so the engine can be driven by any
//! implementation. The HTTP transport lives in `client/`, the directory
//! enumerator in `sources/`.

use crate::request::{RequestPayload, WorkItem};
use crate::response::{Outcome, OutcomeRecord};
use async_trait::async_trait;
use std::path::PathBuf;

// ============================================================================
// Transport Trait
// ============================================================================

/// Performs one call to the detection service
///
/// Implementations must classify every failure into an [`Outcome`] rather
/// than returning an error, and must not retry. They are invoked from many
/// workers at once and must not mutate shared state.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport identifier (e.g., "http")
    fn name(&self) -> &str;

    /// Address the transport sends to
    fn endpoint(&self) -> &str;

    /// Send one payload and classify the result
    async fn send(&self, payload: RequestPayload) -> Outcome;
}

// ============================================================================
// Work Source Trait
// ============================================================================

/// Produces the finite batch of items to dispatch
pub trait WorkSource: Send + Sync {
    /// Source name for identification
    fn name(&self) -> &str;

    /// List every item in the batch
    fn enumerate(&self) -> Result<Vec<WorkItem>, SourceError>;
}

/// Work source errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source location could not be read
    #[error("cannot read {path}: {source}")]
    Unreadable {
        /// Location that failed
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The source location is not a directory
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
}

// ============================================================================
// Outcome Observer
// ============================================================================

/// Receives each record as the engine collects it
///
/// Called from the engine's single collection point, once per item, in
/// completion order.
pub trait OutcomeObserver: Send + Sync {
    /// Handle one collected record
    fn on_outcome(&self, record: &OutcomeRecord);
}

impl<F> OutcomeObserver for F
where
    F: Fn(&OutcomeRecord) + Send + Sync,
{
    fn on_outcome(&self, record: &OutcomeRecord) {
        self(record)
    }
}
