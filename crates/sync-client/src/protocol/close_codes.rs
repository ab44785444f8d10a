//! WebSocket close codes
//!
//! The transport-level close codes this client sees and acts on. Code 1000
//! is reserved to mean "intentional, do not reconnect"; every other code is
//! treated as abnormal and triggers the supervisor's reconnect path.

use serde::{Deserialize, Serialize};

/// WebSocket close codes (RFC 6455)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Normal closure, requested locally; never reconnected
    Normal = 1000,
    /// Endpoint is going away (server shutdown, page navigation)
    GoingAway = 1001,
    /// Protocol error
    ProtocolError = 1002,
    /// Unsupported data type received
    UnsupportedData = 1003,
    /// No status code was present in the close frame
    NoStatus = 1005,
    /// Connection dropped without a close handshake
    Abnormal = 1006,
    /// Payload was not valid for the message type
    InvalidPayload = 1007,
    /// Policy violation
    PolicyViolation = 1008,
    /// Message too large
    MessageTooBig = 1009,
    /// Server hit an unexpected condition
    InternalError = 1011,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1000 => Some(Self::Normal),
            1001 => Some(Self::GoingAway),
            1002 => Some(Self::ProtocolError),
            1003 => Some(Self::UnsupportedData),
            1005 => Some(Self::NoStatus),
            1006 => Some(Self::Abnormal),
            1007 => Some(Self::InvalidPayload),
            1008 => Some(Self::PolicyViolation),
            1009 => Some(Self::MessageTooBig),
            1011 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if a raw close code calls for a reconnect attempt
    ///
    /// Only 1000 means the closure was intentional; anything else — known or
    /// not — is abnormal from this client's point of view.
    #[must_use]
    pub const fn should_reconnect(code: u16) -> bool {
        code != Self::Normal.as_u16()
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Normal => "Normal closure",
            Self::GoingAway => "Endpoint going away",
            Self::ProtocolError => "Protocol error",
            Self::UnsupportedData => "Unsupported data",
            Self::NoStatus => "No status code present",
            Self::Abnormal => "Abnormal closure",
            Self::InvalidPayload => "Invalid frame payload",
            Self::PolicyViolation => "Policy violation",
            Self::MessageTooBig => "Message too big",
            Self::InternalError => "Internal server error",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
