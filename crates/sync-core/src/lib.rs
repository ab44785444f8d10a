//! # sync-core
//!
//! Domain layer containing the comment tree entities, typed mutation events,
//! and the reconciliation engine that merges snapshot, stream, and local
//! writes into a single consistent tree.
//! This crate has zero dependencies on transport (HTTP, WebSocket, etc.).

pub mod engine;
pub mod entities;
pub mod error;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use engine::{ApplyOutcome, IgnoreReason, Reconciler};
pub use entities::{Attachment, Author, Comment, CommentThread, Pagination, Reaction};
pub use error::DomainError;
pub use events::{CommentAction, CommentEvent};
pub use value_objects::{CommentId, DocumentId, IdParseError, TicketId, UserId};
