//! Builder pattern for Orchestrator construction

use std::sync::Arc;
use std::time::Duration;

use crate::channel::ChannelConfig;
use crate::config::DispatchConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::request::{IdentityMode, RequestEncoder};
use crate::traits::{OutcomeObserver, Transport, WorkSource};

use super::executor::Orchestrator;

/// Builder for creating an Orchestrator with proper configuration
///
/// # Example
///
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .num_workers(8)
///     .request_timeout(Duration::from_secs(60))
///     .transport(transport)
///     .source(source)
///     .build()?;
/// ```
pub struct OrchestratorBuilder {
    config: DispatchConfig,
    transport: Option<Arc<dyn Transport>>,
    source: Option<Arc<dyn WorkSource>>,
    encoder: RequestEncoder,
    observer: Option<Arc<dyn OutcomeObserver>>,
    channel_config: ChannelConfig,
}

impl OrchestratorBuilder {
    /// Create a new orchestrator builder with default configuration
    pub fn new() -> Self {
        Self {
            config: DispatchConfig::default(),
            transport: None,
            source: None,
            encoder: RequestEncoder::default(),
            observer: None,
            channel_config: ChannelConfig::default(),
        }
    }

    /// Set the full dispatch configuration
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the pool size (admission bound)
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.config.num_workers = num_workers;
        self
    }

    /// Set the per-call timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the work source
    pub fn source(mut self, source: Arc<dyn WorkSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set how item identifiers are derived
    pub fn identity(mut self, identity: IdentityMode) -> Self {
        self.encoder = RequestEncoder::new(identity);
        self
    }

    /// Set a hook called once per collected record
    pub fn observer(mut self, observer: Arc<dyn OutcomeObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Set the channel configuration
    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = config;
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the transport or source are not set,
    /// or if configuration validation fails.
    pub fn build(self) -> DispatchResult<Orchestrator> {
        self.config
            .validate()
            .map_err(|e| DispatchError::config(e.to_string()))?;

        let transport = self
            .transport
            .ok_or_else(|| DispatchError::missing_config("transport"))?;

        let source = self
            .source
            .ok_or_else(|| DispatchError::missing_config("source"))?;

        let mut orchestrator = Orchestrator::new(self.config, transport, source, self.encoder);
        orchestrator.observer = self.observer;
        orchestrator.channel_config = self.channel_config;

        Ok(orchestrator)
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
