//! # sync-client
//!
//! Transport layer for the thread synchronization engine: the paginated
//! snapshot loader, the supervised event-stream connection, the mutation
//! dispatcher for the viewer's own writes, and the per-ticket session that
//! ties them together around a single serialized apply loop.

pub mod connection;
pub mod dispatch;
pub mod protocol;
pub mod session;
pub mod snapshot;

// Re-export commonly used types at crate root
pub use connection::{ConnectionSupervisor, EventStreamClient};
pub use dispatch::{DocumentUpload, MutationDispatcher, NewComment, RatingUpdate};
pub use protocol::{CloseCode, FrameError, StreamFrame};
pub use session::{SessionRegistry, ThreadSyncSession};
pub use snapshot::{SnapshotLoader, SnapshotPage};
