//! Error types for detect-bench-core
//!
//! Only run-level failures live here. Per-item failures never become a
//! `DispatchError`; they are recorded as an [`Outcome`](crate::Outcome).

use thiserror::Error;

use crate::traits::SourceError;

/// Fatal dispatch error
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Invalid configuration (pool size, timeouts, missing collaborators)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The work source could not be enumerated
    #[error("enumeration error: {0}")]
    Enumeration(#[from] SourceError),

    /// A worker could not continue
    #[error("worker error: {0}")]
    Worker(String),

    /// The admission semaphore was closed under a running worker
    #[error("dispatch shut down before completion")]
    Shutdown,
}

impl DispatchError {
    /// Configuration error with a message
    pub fn config(message: impl Into<String>) -> Self {
        DispatchError::Configuration(message.into())
    }

    /// Configuration error for a builder field that was never set
    pub fn missing_config(field: &str) -> Self {
        DispatchError::Configuration(format!("missing required field: {}", field))
    }

    /// Worker error with a message
    pub fn worker(message: impl Into<String>) -> Self {
        DispatchError::Worker(message.into())
    }

    /// Shutdown error
    pub fn shutdown() -> Self {
        DispatchError::Shutdown
    }

    /// Whether this error happened before any item was dispatched
    pub fn is_pre_dispatch(&self) -> bool {
        matches!(
            self,
            DispatchError::Configuration(_) | DispatchError::Enumeration(_)
        )
    }
}

/// Result type alias
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
