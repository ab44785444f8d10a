//! Paginated snapshot loading

mod loader;

pub use loader::{SnapshotLoader, SnapshotPage};
