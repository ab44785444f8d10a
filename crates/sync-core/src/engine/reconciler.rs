//! The reconciliation engine
//!
//! Owns the canonical in-memory tree for one ticket and exposes a single
//! `apply` entry point that the snapshot seed, the event stream, and local
//! write confirmations all feed through. Application is idempotent and
//! order-tolerant: the same final tree results regardless of duplicate
//! delivery or of the relative arrival order of an event and its local echo.
//!
//! The engine has no interior synchronization. Serialization is the owner's
//! contract: exactly one caller drives `apply` at a time (the session's
//! single-threaded apply loop).

use crate::entities::{Comment, CommentThread, Pagination};
use crate::error::DomainError;
use crate::events::{CommentAction, CommentEvent};
use crate::value_objects::{CommentId, TicketId};

/// Why an event was dropped without changing the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A comment with the same id already exists (duplicate delivery)
    Duplicate,
    /// A reply whose parent root is not present (no orphan insertion)
    OrphanReply,
    /// An in-place update or delete whose target id is absent
    TargetMissing,
    /// An action this client does not understand
    UnknownAction,
}

/// Result of applying one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new comment entered the tree
    Inserted,
    /// An existing comment was replaced with the server-confirmed version
    Replaced,
    /// A comment left the tree
    Removed,
    /// The event did not change the tree
    Ignored(IgnoreReason),
}

impl ApplyOutcome {
    /// Check if the event changed the tree
    #[must_use]
    pub const fn changed(self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

/// The reconciliation engine for one ticket's thread
#[derive(Debug, Clone)]
pub struct Reconciler {
    thread: CommentThread,
}

impl Reconciler {
    /// Create an engine with an empty tree
    pub fn new(ticket_id: TicketId) -> Self {
        Self {
            thread: CommentThread::new(ticket_id),
        }
    }

    /// Replace the tree with a snapshot page
    ///
    /// The snapshot is authoritative: any previously merged state for the
    /// same ticket is discarded along with its pagination metadata.
    pub fn seed(&mut self, roots: Vec<Comment>, pagination: Pagination) {
        self.thread.roots = roots;
        self.thread.pagination = pagination;
    }

    /// Read access to the canonical tree
    pub fn thread(&self) -> &CommentThread {
        &self.thread
    }

    /// Consume the engine, yielding the tree
    pub fn into_thread(self) -> CommentThread {
        self.thread
    }

    /// Apply one mutation event
    pub fn apply(&mut self, event: CommentEvent) -> ApplyOutcome {
        match event.action {
            CommentAction::Create => self.apply_create(event.comment),
            CommentAction::Reply => self.apply_reply(event.comment),
            CommentAction::Rate | CommentAction::AttachDocument | CommentAction::DetachDocument => {
                self.apply_replace(event.comment)
            }
            CommentAction::Delete => self.apply_delete(event.comment.id),
            CommentAction::Unknown => ApplyOutcome::Ignored(IgnoreReason::UnknownAction),
        }
    }

    /// Merge a newly created comment, root or reply
    fn apply_create(&mut self, comment: Comment) -> ApplyOutcome {
        if self.thread.contains(comment.id) {
            return ApplyOutcome::Ignored(IgnoreReason::Duplicate);
        }

        match comment.parent {
            Some(parent) => self.insert_under(parent, comment),
            None => {
                self.thread.prepend_root(comment);
                self.thread.pagination.record_root_added();
                ApplyOutcome::Inserted
            }
        }
    }

    /// Merge a reply delivered under its own action name
    ///
    /// Carries its own duplicate guard scoped to the matched root; `create`
    /// and `reply` arrive as distinct wire actions and each must be safe
    /// against redelivery on its own.
    fn apply_reply(&mut self, comment: Comment) -> ApplyOutcome {
        let Some(parent) = comment.parent else {
            return ApplyOutcome::Ignored(IgnoreReason::OrphanReply);
        };
        self.insert_under(parent, comment)
    }

    fn insert_under(&mut self, parent: CommentId, comment: Comment) -> ApplyOutcome {
        let Some(root) = self.thread.find_root_mut(parent) else {
            return ApplyOutcome::Ignored(IgnoreReason::OrphanReply);
        };

        match root.push_reply(comment) {
            Ok(()) => ApplyOutcome::Inserted,
            Err(DomainError::DuplicateComment(_)) => {
                ApplyOutcome::Ignored(IgnoreReason::Duplicate)
            }
            Err(_) => ApplyOutcome::Ignored(IgnoreReason::OrphanReply),
        }
    }

    /// Replace a comment with the server-confirmed version
    ///
    /// Full replace, not a field merge: the server is the source of truth
    /// for reactions and attachments. The target is searched at root level
    /// first, then within each root's reply list.
    fn apply_replace(&mut self, confirmed: Comment) -> ApplyOutcome {
        let id = confirmed.id;

        if let Some(slot) = self.thread.roots.iter_mut().find(|c| c.id == id) {
            *slot = confirmed;
            return ApplyOutcome::Replaced;
        }

        for root in &mut self.thread.roots {
            if let Some(slot) = root.replies.iter_mut().find(|r| r.id == id) {
                *slot = confirmed;
                return ApplyOutcome::Replaced;
            }
        }

        ApplyOutcome::Ignored(IgnoreReason::TargetMissing)
    }

    /// Remove a comment wherever it lives
    ///
    /// The caller does not know a priori whether the id was a root or a
    /// reply; both removals are attempted unconditionally.
    fn apply_delete(&mut self, id: CommentId) -> ApplyOutcome {
        if self.thread.remove(id) {
            ApplyOutcome::Removed
        } else {
            ApplyOutcome::Ignored(IgnoreReason::TargetMissing)
        }
    }
}
