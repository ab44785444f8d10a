//! Outgoing write payloads
//!
//! All write payloads are validated before any network call; a rejected
//! payload never leaves the process.

use serde::Serialize;
use validator::Validate;

use sync_core::{CommentId, TicketId, UserId};

/// A new comment or reply
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewComment {
    pub ticket_id: TicketId,
    pub user_id: UserId,

    #[validate(length(min = 1, max = 4000, message = "Content must be 1-4000 characters"))]
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentId>,
}

impl NewComment {
    /// A new root comment
    pub fn new(ticket_id: TicketId, user_id: UserId, content: impl Into<String>) -> Self {
        Self {
            ticket_id,
            user_id,
            content: content.into(),
            parent: None,
        }
    }

    /// A reply to an existing root comment
    pub fn reply_to(
        ticket_id: TicketId,
        user_id: UserId,
        parent: CommentId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(ticket_id, user_id, content)
        }
    }
}

/// Reaction write payload; `rating: None` clears the user's reaction
#[derive(Debug, Clone, Serialize)]
pub struct RatingUpdate {
    pub user_id: UserId,
    pub rating: Option<String>,
}

impl RatingUpdate {
    /// Set a reaction symbol
    pub fn set(user_id: UserId, symbol: impl Into<String>) -> Self {
        Self {
            user_id,
            rating: Some(symbol.into()),
        }
    }

    /// Clear the user's reaction
    pub fn clear(user_id: UserId) -> Self {
        Self {
            user_id,
            rating: None,
        }
    }
}

/// A file to attach to a comment
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Create an upload from raw bytes
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}
