//! detect-bench-core: Dispatch engine for batch image detection
//!
//! This crate provides the engine and the types shared by every detect-bench
//! component, including:
//!
//! - Work items, item identifiers and request encoding
//! - Classified outcomes and per-item records
//! - Core traits (Transport, WorkSource, OutcomeObserver)
//! - The bounded worker pool and its orchestrator
//! - Run statistics and error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod request;
pub mod response;
pub mod traits;
pub mod worker;

#[cfg(test)]
mod testing;

pub use channel::ChannelConfig;
pub use config::{ConfigError, DispatchConfig, DEFAULT_REQUEST_TIMEOUT};
pub use error::*;
pub use metrics::*;
pub use orchestrator::{aggregate_outcomes, DispatchRun, Orchestrator, OrchestratorBuilder};
pub use request::*;
pub use response::*;
pub use traits::*;
pub use worker::{Worker, WorkerBuilder, WorkerStats};
