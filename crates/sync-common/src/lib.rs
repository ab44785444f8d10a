//! # sync-common
//!
//! Shared utilities for the thread synchronization workspace: configuration
//! loading, the application error taxonomy, and telemetry setup.

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{AppSettings, ConfigError, Environment, ServiceConfig, StreamConfig, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig, TracingError};
