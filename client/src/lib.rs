//! Transport implementations for detect-bench
//!
//! This crate provides the `Transport` implementation that talks to the
//! detection service over HTTP:
//!
//! - [`HttpTransport`]: one JSON `POST` per item, no retries
//! - [`TransportConfig`]: endpoint and timeouts, validated before use

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod http;

pub use config::{ConfigValidationError, TransportConfig};
pub use http::HttpTransport;
