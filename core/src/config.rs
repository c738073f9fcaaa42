//! Dispatch configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-call timeout, matching the inference service contract
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Dispatch configuration
///
/// Defines the admission bound of the worker pool and the deadline applied
/// to every individual transport call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum number of in-flight transport calls
    pub num_workers: usize,

    /// Deadline for a single call; expiry yields a timeout outcome
    #[serde(default = "default_request_timeout")]
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            num_workers: 1,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl DispatchConfig {
    /// Create a new config with the given pool size
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Default::default()
        }
    }

    /// Set the per-call timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(
                "number of workers must be at least 1".into(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "request timeout must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid pool size
    #[error("Invalid worker count: {0}")]
    InvalidWorkerCount(String),

    /// Invalid per-call timeout
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}
