//! Output module for persisting harvest results
//!
//! This module handles:
//! - The snapshot document and its JSON sink
//! - Guarding against replacing a good snapshot with an empty one
//! - Summarizing records by category

mod guard;
mod snapshot;
pub mod stats;

pub use guard::{persist_if_safe, should_persist, PersistOutcome};
pub use snapshot::{load_snapshot, JsonSnapshotWriter, Snapshot, SnapshotSink, UPDATED_AT_FORMAT};
pub use stats::{print_breakdown, CategoryBreakdown};
