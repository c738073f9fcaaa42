//! Work sources for detect-bench
//!
//! This crate provides the `WorkSource` implementation that lists image
//! files in a directory ([`DirectorySource`]).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod directory;

pub use directory::{DirectorySource, DEFAULT_EXTENSION};
