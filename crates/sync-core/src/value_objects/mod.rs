//! Value objects - typed identifiers

mod ids;

pub use ids::{CommentId, DocumentId, IdParseError, TicketId, UserId};
