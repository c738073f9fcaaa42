//! Report generation for detect-bench runs
//!
//! This crate provides:
//!
//! - Per-item outcome lines and the run summary for the console
//! - JSON export of a completed run

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod console;
pub mod json_export;

pub use console::{breakdown_line, outcome_line, summary_line};
pub use json_export::JsonExporter;
