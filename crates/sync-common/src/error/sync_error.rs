//! Application error types
//!
//! Unified error handling for every fallible surface of the synchronization
//! engine. Nothing here is fatal to the process; failures are local to one
//! ticket's session.

use std::fmt;

use sync_core::DomainError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    // Transport errors (connection drop, socket failure)
    #[error("Transport error: {0}")]
    Transport(String),

    // Non-2xx responses from the REST service
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    // Malformed payloads and frames
    #[error("Decode error: {0}")]
    Decode(String),

    // Rejected outgoing writes (before any network call)
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl SyncError {
    /// Create a transport error from any displayable cause
    #[must_use]
    pub fn transport(cause: impl fmt::Display) -> Self {
        Self::Transport(cause.to_string())
    }

    /// Create a decode error
    #[must_use]
    pub fn decode(cause: impl fmt::Display) -> Self {
        Self::Decode(cause.to_string())
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create an HTTP error from a status and body excerpt
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a not found error for a resource
    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    /// Check if the error came from the transport layer
    ///
    /// Transport failures are the only class the engine recovers from on its
    /// own (by scheduling a reconnect); everything else is surfaced.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if (400..500).contains(status))
            || matches!(self, Self::Validation(_) | Self::NotFound(_))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if (500..600).contains(status))
    }
}

/// Result type alias for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;
