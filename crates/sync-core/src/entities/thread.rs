//! Comment thread - the per-ticket tree of root comments and replies

use crate::entities::Comment;
use crate::value_objects::{CommentId, TicketId};

/// Pagination metadata for a thread's root-level listing
///
/// The page size is fixed by the backend; `total_pages` is always derived
/// from `count`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pagination {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl Pagination {
    /// Fixed root-level page size
    pub const PAGE_SIZE: u64 = 10;

    /// Create pagination metadata, deriving `total_pages` from `count`
    pub fn new(count: u64, next: Option<String>, previous: Option<String>, current_page: u32) -> Self {
        Self {
            count,
            next,
            previous,
            current_page,
            total_pages: Self::total_pages_for(count),
        }
    }

    /// Number of pages needed for `count` items
    pub fn total_pages_for(count: u64) -> u32 {
        count.div_ceil(Self::PAGE_SIZE) as u32
    }

    /// Account for one root comment merged while the stream is live
    pub fn record_root_added(&mut self) {
        self.count += 1;
        self.total_pages = Self::total_pages_for(self.count);
    }
}

/// The canonical in-memory tree for one ticket's discussion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentThread {
    pub ticket_id: TicketId,
    pub roots: Vec<Comment>,
    pub pagination: Pagination,
}

impl CommentThread {
    /// Create an empty thread for a ticket
    pub fn new(ticket_id: TicketId) -> Self {
        Self {
            ticket_id,
            roots: Vec::new(),
            pagination: Pagination::default(),
        }
    }

    /// Check if a comment with the given id exists anywhere in the tree
    pub fn contains(&self, id: CommentId) -> bool {
        self.find(id).is_some()
    }

    /// Find a comment by id, searching roots first, then each root's replies
    pub fn find(&self, id: CommentId) -> Option<&Comment> {
        for root in &self.roots {
            if root.id == id {
                return Some(root);
            }
            if let Some(reply) = root.find_reply(id) {
                return Some(reply);
            }
        }
        None
    }

    /// Find a root comment by id, mutably
    pub fn find_root_mut(&mut self, id: CommentId) -> Option<&mut Comment> {
        self.roots.iter_mut().find(|c| c.id == id)
    }

    /// Prepend a root comment (newest-first ordering)
    pub fn prepend_root(&mut self, comment: Comment) {
        self.roots.insert(0, comment);
    }

    /// Remove a comment by id from the root list and from every root's
    /// reply list; both removals are attempted unconditionally.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, id: CommentId) -> bool {
        let roots_before = self.roots.len();
        self.roots.retain(|c| c.id != id);
        let mut removed = self.roots.len() != roots_before;

        for root in &mut self.roots {
            let replies_before = root.replies.len();
            root.replies.retain(|r| r.id != id);
            removed |= root.replies.len() != replies_before;
        }

        removed
    }

    /// Total number of comments held in memory (roots + replies)
    pub fn len(&self) -> usize {
        self.roots.len() + self.roots.iter().map(|r| r.replies.len()).sum::<usize>()
    }

    /// Check if the tree holds no comments
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
