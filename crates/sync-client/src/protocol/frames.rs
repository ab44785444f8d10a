//! Inbound stream frames
//!
//! Every frame on the event stream is UTF-8 JSON of the shape
//! `{"type": "comment_update", "action": "...", "comment": {...}}`.
//! Decoding failures are typed so the stream client can log and discard
//! without touching the connection.

use serde::Deserialize;

use sync_core::{CommentAction, CommentEvent};

use super::payloads::CommentWire;

/// The only frame type this client consumes
pub const COMMENT_UPDATE: &str = "comment_update";

/// A raw inbound frame
#[derive(Debug, Clone, Deserialize)]
pub struct StreamFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub action: String,
    pub comment: CommentWire,
}

/// Frame decoding errors
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected frame type: {0}")]
    UnexpectedKind(String),

    #[error("comment payload carries no id")]
    MissingId,
}

impl StreamFrame {
    /// Decode a text frame into a normalized mutation event
    ///
    /// Unknown `action` names decode to `CommentAction::Unknown` and are
    /// forwarded; the engine resolves them to a no-op.
    pub fn decode(text: &str, origin: &str) -> Result<CommentEvent, FrameError> {
        let frame: StreamFrame = serde_json::from_str(text)?;
        if frame.kind != COMMENT_UPDATE {
            return Err(FrameError::UnexpectedKind(frame.kind));
        }

        let action = CommentAction::parse(&frame.action);
        let comment = frame
            .comment
            .into_domain(origin)
            .ok_or(FrameError::MissingId)?;

        Ok(CommentEvent::new(action, comment))
    }
}
