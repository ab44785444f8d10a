//! Wire protocol
//!
//! Frame decoding, close codes, and the normalization of loose wire payloads
//! into canonical domain types. All shape tolerance (legacy id fields,
//! nested document metadata, relative URLs) ends at this boundary; the
//! engine only ever sees normalized comments.

mod close_codes;
mod frames;
mod payloads;

pub use close_codes::CloseCode;
pub use frames::{FrameError, StreamFrame, COMMENT_UPDATE};
pub use payloads::{AuthorWire, CommentWire, DocumentWire, RatingWire};
