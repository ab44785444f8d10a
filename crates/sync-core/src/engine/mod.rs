//! Reconciliation engine
//!
//! Merges mutation events from every input channel into the canonical tree,
//! tolerating out-of-order and duplicate delivery.

mod reconciler;

pub use reconciler::{ApplyOutcome, IgnoreReason, Reconciler};
