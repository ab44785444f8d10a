//! Application configuration structs
//!
//! Loads configuration from environment variables and an optional .env file.

use serde::Deserialize;
use std::env;
use std::time::Duration;
use url::Url;

use sync_core::TicketId;

/// Main configuration for the synchronization engine
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub app: AppSettings,
    pub service: ServiceConfig,
    pub stream: StreamConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// REST service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the comment service, e.g. `http://localhost:8000/api`
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ServiceConfig {
    /// Request timeout as a `Duration`
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The service origin (`scheme://host[:port]`), used to absolutize
    /// relative download URLs carried in payloads.
    pub fn origin(&self) -> Result<String, ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|_| ConfigError::InvalidValue("SYNC_BASE_URL", self.base_url.clone()))?;
        let mut origin = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
        if let Some(port) = url.port() {
            origin.push_str(&format!(":{port}"));
        }
        Ok(origin)
    }

    /// Event stream URL for a ticket: the HTTP scheme of the REST base is
    /// substituted for its WebSocket equivalent and `/ws/comments/{ticket}/`
    /// is appended at the origin.
    pub fn stream_url(&self, ticket_id: TicketId) -> Result<String, ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|_| ConfigError::InvalidValue("SYNC_BASE_URL", self.base_url.clone()))?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        let mut host = url.host_str().unwrap_or_default().to_string();
        if let Some(port) = url.port() {
            host.push_str(&format!(":{port}"));
        }
        Ok(format!("{scheme}://{host}/ws/comments/{ticket_id}/"))
    }
}

/// Event stream configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Fixed delay before re-establishing a dropped connection
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Capacity of the bounded event channel feeding the apply loop
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl StreamConfig {
    /// Reconnect delay as a `Duration`
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

// Default value functions
fn default_app_name() -> String {
    "thread-sync".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_channel_capacity() -> usize {
    64
}

impl SyncConfig {
    /// Build a configuration around a service base URL with default settings
    #[must_use]
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::default(),
            },
            service: ServiceConfig {
                base_url: base_url.into(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            stream: StreamConfig {
                reconnect_delay_ms: default_reconnect_delay_ms(),
                channel_capacity: default_channel_capacity(),
            },
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            service: ServiceConfig {
                base_url: env::var("SYNC_BASE_URL")
                    .map_err(|_| ConfigError::MissingVar("SYNC_BASE_URL"))?,
                request_timeout_secs: env::var("SYNC_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_request_timeout_secs),
            },
            stream: StreamConfig {
                reconnect_delay_ms: env::var("SYNC_RECONNECT_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_reconnect_delay_ms),
                channel_capacity: env::var("SYNC_CHANNEL_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_channel_capacity),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
