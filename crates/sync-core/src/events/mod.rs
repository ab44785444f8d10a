//! Typed mutation events
//!
//! Every input channel — snapshot seed, push stream, local writes — is
//! normalized into these events before reaching the reconciliation engine.

mod comment_event;

pub use comment_event::{CommentAction, CommentEvent};
