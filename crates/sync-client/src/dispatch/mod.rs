//! Mutation dispatch
//!
//! The viewer's own writes. Each operation is an independent request; none
//! of them refresh the tree directly — the confirmed mutation is fed through
//! the same apply path as a remote peer's change.

mod dispatcher;
mod requests;

pub use dispatcher::MutationDispatcher;
pub use requests::{DocumentUpload, NewComment, RatingUpdate};
