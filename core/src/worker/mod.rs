//! Worker module for dispatching work items
//!
//! A Worker is the execution unit of the dispatch pool, responsible for the
//! loop: **claim -> encode -> send -> report -> repeat**.
//!
//! Each Worker is a tokio task that:
//!
//! 1. Claims the next unprocessed item through a shared atomic cursor
//! 2. Acquires a permit from the shared admission semaphore
//! 3. Encodes the item and sends it through the Transport under a deadline
//! 4. Sends the classified outcome to the engine via channel
//! 5. Repeats until every item has been claimed
//!
//! A failing item never stops the worker; only a closed channel or semaphore
//! does.
//!
//! # Example
//!
//! ```ignore
//! use detect_bench_core::worker::{Worker, WorkerBuilder, WorkerStats};
//!
//! let worker = WorkerBuilder::new(0)
//!     .transport(transport)
//!     .items(items, cursor)
//!     .outcome_tx(tx)
//!     .semaphore(semaphore)
//!     .build()?;
//!
//! let stats = worker.run().await?;
//! println!("Succeeded: {}", stats.succeeded());
//! ```

mod builder;
mod executor;
mod stats;

pub use builder::WorkerBuilder;
pub use executor::Worker;
pub use stats::WorkerStats;
