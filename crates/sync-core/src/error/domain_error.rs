//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::CommentId;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Comment already exists: {0}")]
    DuplicateComment(CommentId),

    #[error("Root comment not found: {0}")]
    RootNotFound(CommentId),

    #[error("Comment not found: {0}")]
    CommentNotFound(CommentId),

    #[error("Reply {0} carries no parent")]
    MissingParent(CommentId),

    #[error("Replies may not be nested below one level (offender: {0})")]
    NestedReply(CommentId),
}

impl DomainError {
    /// Get a stable machine-readable error code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateComment(_) => "DUPLICATE_COMMENT",
            Self::RootNotFound(_) => "ROOT_NOT_FOUND",
            Self::CommentNotFound(_) => "COMMENT_NOT_FOUND",
            Self::MissingParent(_) => "MISSING_PARENT",
            Self::NestedReply(_) => "NESTED_REPLY",
        }
    }

    /// Check if this is a not-found error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RootNotFound(_) | Self::CommentNotFound(_))
    }

    /// Check if this is a duplicate/conflict error
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateComment(_))
    }
}
