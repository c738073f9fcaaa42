//! Orchestrator: the bounded-concurrency dispatch engine
//!
//! The Orchestrator coordinates one batch:
//! - Enumerating the work source
//! - Spawning a pool of at most `num_workers` worker tasks
//! - Bounding in-flight calls with a shared semaphore
//! - Collecting exactly one outcome per item through a single channel
//! - Blocking until the whole batch is done, then aggregating
//!
//! # Example
//!
//! ```ignore
//! use detect_bench_core::OrchestratorBuilder;
//!
//! let orchestrator = OrchestratorBuilder::new()
//!     .num_workers(4)
//!     .transport(transport)
//!     .source(source)
//!     .build()?;
//!
//! let run = orchestrator.run().await?;
//! let stats = run.statistics();
//! ```

mod aggregator;
mod builder;
mod executor;

pub use aggregator::aggregate_outcomes;
pub use builder::OrchestratorBuilder;
pub use executor::{DispatchRun, Orchestrator};
