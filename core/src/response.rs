//! Per-item outcomes

use crate::request::{ItemId, WorkItem};
use serde::{Deserialize, Serialize};

/// Terminal, classified result of one item
///
/// Every variant other than `Success` is a per-item failure. None of them are
/// fatal to the run and none are retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// 2xx response
    Success {
        /// Response body as returned by the service
        body: String,
    },

    /// Non-2xx response
    ServiceError {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// No connection could be established
    ConnectionError {
        /// Error description
        cause: String,
    },

    /// No response within the per-call timeout
    TimeoutError {
        /// Error description
        cause: String,
    },

    /// The item could not be read or encoded
    EncodingError {
        /// Error description
        cause: String,
    },

    /// Any other transport failure
    UnexpectedError {
        /// Error description
        cause: String,
    },
}

impl Outcome {
    /// Discriminant of this outcome
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Success { .. } => OutcomeKind::Success,
            Outcome::ServiceError { .. } => OutcomeKind::ServiceError,
            Outcome::ConnectionError { .. } => OutcomeKind::ConnectionError,
            Outcome::TimeoutError { .. } => OutcomeKind::TimeoutError,
            Outcome::EncodingError { .. } => OutcomeKind::EncodingError,
            Outcome::UnexpectedError { .. } => OutcomeKind::UnexpectedError,
        }
    }

    /// Check if the item succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Check if the item failed
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// HTTP status, when a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::ServiceError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Outcome discriminant used for counting
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// 2xx response
    Success,
    /// Non-2xx response
    ServiceError,
    /// Connection failure
    ConnectionError,
    /// Per-call timeout
    TimeoutError,
    /// Unreadable or empty input
    EncodingError,
    /// Anything else
    UnexpectedError,
}

impl OutcomeKind {
    /// All kinds, in reporting order
    pub fn all() -> &'static [OutcomeKind] {
        &[
            OutcomeKind::Success,
            OutcomeKind::ServiceError,
            OutcomeKind::ConnectionError,
            OutcomeKind::TimeoutError,
            OutcomeKind::EncodingError,
            OutcomeKind::UnexpectedError,
        ]
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeKind::Success => write!(f, "success"),
            OutcomeKind::ServiceError => write!(f, "service_error"),
            OutcomeKind::ConnectionError => write!(f, "connection_error"),
            OutcomeKind::TimeoutError => write!(f, "timeout_error"),
            OutcomeKind::EncodingError => write!(f, "encoding_error"),
            OutcomeKind::UnexpectedError => write!(f, "unexpected_error"),
        }
    }
}

/// Record of one processed item, as collected by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Position of the item in the enumerated batch
    pub index: usize,

    /// The item
    pub item: WorkItem,

    /// Identifier, absent when encoding failed before one was derived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,

    /// Classified result
    pub outcome: Outcome,

    /// Worker that processed the item; `None` if its worker died first
    pub worker_id: Option<usize>,

    /// Encode + call latency in milliseconds
    pub latency_ms: f64,

    /// When the outcome was produced
    pub completed_at: chrono::DateTime<chrono::Utc>,
}
