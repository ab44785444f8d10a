//! Comment mutation events
//!
//! Action names match the wire protocol's `action` field. Unrecognized
//! actions deserialize to `Unknown` so newer servers do not break older
//! clients; the engine resolves them to a no-op.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::{Author, Comment};
use crate::value_objects::CommentId;

/// Mutation event actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentAction {
    /// A comment was created (root or reply)
    Create,
    /// A reply was created (delivered as its own action by the protocol)
    Reply,
    /// A comment's reactions changed
    Rate,
    /// A document was attached to a comment
    AttachDocument,
    /// A document was detached from a comment
    DetachDocument,
    /// A comment was deleted
    Delete,
    /// Forward-compatible catch-all for actions this client does not know
    #[serde(other)]
    Unknown,
}

impl CommentAction {
    /// Get the wire name of the action
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Reply => "reply",
            Self::Rate => "rate",
            Self::AttachDocument => "attach_document",
            Self::DetachDocument => "detach_document",
            Self::Delete => "delete",
            Self::Unknown => "unknown",
        }
    }

    /// Parse an action from its wire name; unrecognized names map to `Unknown`
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "create" => Self::Create,
            "reply" => Self::Reply,
            "rate" => Self::Rate,
            "attach_document" => Self::AttachDocument,
            "detach_document" => Self::DetachDocument,
            "delete" => Self::Delete,
            _ => Self::Unknown,
        }
    }

    /// Check if the action mutates an existing comment in place
    #[must_use]
    pub const fn is_in_place_update(self) -> bool {
        matches!(self, Self::Rate | Self::AttachDocument | Self::DetachDocument)
    }
}

impl fmt::Display for CommentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single mutation event against one thread's tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEvent {
    pub action: CommentAction,
    pub comment: Comment,
}

impl CommentEvent {
    /// Create a new event
    pub fn new(action: CommentAction, comment: Comment) -> Self {
        Self { action, comment }
    }

    /// Create a delete event for a comment id
    ///
    /// Deletion only needs the id; the rest of the payload is a placeholder.
    pub fn deletion(id: CommentId) -> Self {
        Self::new(CommentAction::Delete, Comment::new(id, Author::default(), ""))
    }
}
