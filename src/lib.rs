//! snaplink - expiring short links with click accounting
//!
//! The core is [`storage::MappingStore`]: unique code assignment under
//! concurrent creates, expiry-aware resolution, and per-record atomic click
//! accounting. Everything else is a thin layer around it.
//!
//! # Features
//! - **server**: HTTP API and redirect service (default)
//! - **cli**: Command-line entry point
//!
//! # Architecture
//! - `storage`: Mapping records and the concurrent store
//! - `utils`: Code generation and URL validation
//! - `analytics`: Fire-and-forget access log with pluggable sinks
//! - `api`: HTTP services
//! - `config`: Configuration management
//! - `runtime`: Server lifecycle
//! - `system`: Logging and clock

pub mod analytics;
#[cfg(feature = "server")]
pub mod api;
pub mod config;
pub mod errors;
#[cfg(feature = "server")]
pub mod runtime;
pub mod storage;
pub mod system;
pub mod utils;

pub use errors::{Result, SnaplinkError};
pub use storage::{CreateMappingRequest, MappingRecord, MappingStore, RequestContext};
