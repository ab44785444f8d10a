//! Comment entity - a discussion item in a ticket thread
//!
//! Nesting is exactly one level deep: a root comment may hold replies, a
//! reply may not.

use chrono::{DateTime, Utc};

use crate::entities::{Attachment, Reaction};
use crate::error::DomainError;
use crate::value_objects::{CommentId, DocumentId, UserId};

/// Display fields for the comment author
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Author {
    pub id: UserId,
    pub full_name: String,
    pub role: Option<String>,
}

impl Author {
    /// Create a new Author
    pub fn new(id: UserId, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            role: None,
        }
    }

    /// Attach a role label
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Comment entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub parent: Option<CommentId>,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    pub attachments: Vec<Attachment>,
    pub reactions: Vec<Reaction>,
    pub replies: Vec<Comment>,
}

impl Comment {
    /// Create a new root comment
    pub fn new(id: CommentId, author: Author, content: impl Into<String>) -> Self {
        Self {
            id,
            parent: None,
            author,
            content: content.into(),
            created_at: Utc::now(),
            edited: false,
            attachments: Vec::new(),
            reactions: Vec::new(),
            replies: Vec::new(),
        }
    }

    /// Create a new reply to a root comment
    pub fn new_reply(
        id: CommentId,
        parent: CommentId,
        author: Author,
        content: impl Into<String>,
    ) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(id, author, content)
        }
    }

    /// Check if the comment is a root item
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Check if the comment is a reply
    #[inline]
    pub fn is_reply(&self) -> bool {
        self.parent.is_some()
    }

    /// Look up a direct reply by id
    pub fn find_reply(&self, id: CommentId) -> Option<&Comment> {
        self.replies.iter().find(|r| r.id == id)
    }

    /// Check if a direct reply with the given id exists
    pub fn has_reply(&self, id: CommentId) -> bool {
        self.replies.iter().any(|r| r.id == id)
    }

    /// Append a reply under this comment
    ///
    /// Rejects nesting below one level and duplicate reply ids.
    pub fn push_reply(&mut self, reply: Comment) -> Result<(), DomainError> {
        if self.is_reply() {
            return Err(DomainError::NestedReply(reply.id));
        }
        if self.has_reply(reply.id) {
            return Err(DomainError::DuplicateComment(reply.id));
        }
        self.replies.push(reply);
        Ok(())
    }

    /// Set a user's reaction, replacing any prior reaction from the same user
    ///
    /// At most one reaction per user per comment; matching is by user id.
    pub fn set_reaction(&mut self, user_id: UserId, symbol: impl Into<String>) {
        self.reactions.retain(|r| !r.is_from(user_id));
        self.reactions.push(Reaction::new(user_id, symbol));
    }

    /// Remove a user's reaction; returns whether one was present
    pub fn clear_reaction(&mut self, user_id: UserId) -> bool {
        let before = self.reactions.len();
        self.reactions.retain(|r| !r.is_from(user_id));
        self.reactions.len() != before
    }

    /// Get a user's current reaction, if any
    pub fn reaction_of(&self, user_id: UserId) -> Option<&Reaction> {
        self.reactions.iter().find(|r| r.is_from(user_id))
    }

    /// Append an attachment; returns false if the id is already present
    pub fn add_attachment(&mut self, attachment: Attachment) -> bool {
        if self.has_attachment(attachment.id) {
            return false;
        }
        self.attachments.push(attachment);
        true
    }

    /// Check if an attachment with the given id exists
    pub fn has_attachment(&self, id: DocumentId) -> bool {
        self.attachments.iter().any(|a| a.id == id)
    }
}
