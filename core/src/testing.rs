//! Shared mocks and fixtures for engine tests

use crate::request::{InferenceRequest, RequestPayload, WorkItem};
use crate::response::Outcome;
use crate::traits::{SourceError, Transport, WorkSource};

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// ============================================================================
// Mock Transport
// ============================================================================

/// Transport whose behaviour is scripted by the image bytes:
///
/// - `fail...`   -> HTTP 500
/// - `hang...`   -> never responds
/// - `refuse...` -> connection error
/// - `panic...`  -> panics inside the call
/// - anything else -> 200 after the configured delay
pub(crate) struct MockTransport {
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Highest number of simultaneous `send` calls observed
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight counter even when the call is cancelled
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn endpoint(&self) -> &str {
        "mock://detector"
    }

    async fn send(&self, payload: RequestPayload) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let request: InferenceRequest = match serde_json::from_slice(&payload.body) {
            Ok(request) => request,
            Err(e) => {
                return Outcome::UnexpectedError {
                    cause: e.to_string(),
                }
            }
        };
        let image = general_purpose::STANDARD
            .decode(&request.image)
            .unwrap_or_default();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if image.starts_with(b"panic") {
            panic!("detector client bug");
        } else if image.starts_with(b"fail") {
            Outcome::ServiceError {
                status: 500,
                body: r#"{"error": "detector failed"}"#.to_string(),
            }
        } else if image.starts_with(b"hang") {
            std::future::pending::<Outcome>().await
        } else if image.starts_with(b"refuse") {
            Outcome::ConnectionError {
                cause: "connection refused".to_string(),
            }
        } else {
            Outcome::Success {
                body: format!(r#"{{"id": "{}", "object": []}}"#, request.id),
            }
        }
    }
}

// ============================================================================
// Mock WorkSource
// ============================================================================

pub(crate) struct MockSource {
    items: Vec<WorkItem>,
    unreadable: bool,
}

impl MockSource {
    pub(crate) fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items,
            unreadable: false,
        }
    }

    pub(crate) fn unreadable() -> Self {
        Self {
            items: Vec::new(),
            unreadable: true,
        }
    }
}

impl WorkSource for MockSource {
    fn name(&self) -> &str {
        "mock-source"
    }

    fn enumerate(&self) -> Result<Vec<WorkItem>, SourceError> {
        if self.unreadable {
            return Err(SourceError::Unreadable {
                path: "/mock/images".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            });
        }
        Ok(self.items.clone())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Write one file per entry into `dir` and return the matching work items
pub(crate) fn write_batch(dir: &Path, contents: &[&[u8]]) -> Vec<WorkItem> {
    contents
        .iter()
        .enumerate()
        .map(|(i, bytes)| {
            let path = dir.join(format!("img_{:03}.jpg", i));
            std::fs::write(&path, bytes).expect("failed to write fixture");
            WorkItem::new(path)
        })
        .collect()
}

/// `n` images that all succeed
pub(crate) fn write_ok_batch(dir: &Path, n: usize) -> Vec<WorkItem> {
    let contents: Vec<&[u8]> = (0..n).map(|_| b"ok-image".as_slice()).collect();
    write_batch(dir, &contents)
}
