//! Application lifecycle
//!
//! `prepare_server_startup` builds the shared components from config;
//! `run_server` binds the HTTP listener and flushes the access log on exit.

pub mod server;

pub use server::{ServerComponents, prepare_server_startup, run_server};
