//! Output guard
//!
//! An empty result usually means the board blocked us, not that nothing is
//! for sale, so it must never replace a good snapshot.

use crate::output::snapshot::{Snapshot, SnapshotSink};
use crate::record::CrawlResult;
use crate::HarvestError;

/// What happened to a crawl result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The snapshot was replaced with this many records
    Written(usize),

    /// Nothing was written; any previous snapshot is untouched
    Skipped,
}

/// Returns true if `result` may replace the stored snapshot
pub fn should_persist(result: &CrawlResult) -> bool {
    !result.is_empty()
}

/// Hands `result` to `sink` only if the guard allows it
pub fn persist_if_safe(
    result: CrawlResult,
    sink: &mut dyn SnapshotSink,
) -> Result<PersistOutcome, HarvestError> {
    if !should_persist(&result) {
        tracing::warn!("No records harvested; keeping the previous snapshot");
        return Ok(PersistOutcome::Skipped);
    }

    let records = result.len();
    sink.write(&Snapshot::from_result(result))?;
    Ok(PersistOutcome::Written(records))
}
