//! Configuration loading

mod app_config;

pub use app_config::{
    AppSettings, ConfigError, Environment, ServiceConfig, StreamConfig, SyncConfig,
};
