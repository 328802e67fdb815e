//! Snapshot document and its JSON sink
//!
//! The snapshot is what the downstream viewer reads:
//!
//! ```json
//! {
//!   "updated_at": "2024/11/15 09:30",
//!   "data": [
//!     { "title": "...", "link": "...", "date": "11/15", "category": "iPhone", "location": "台北", "price": "$23500" }
//!   ]
//! }
//! ```

use crate::record::{CrawlResult, ListingRecord};
use crate::HarvestError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Local-time format of `updated_at`
pub const UPDATED_AT_FORMAT: &str = "%Y/%m/%d %H:%M";

/// The persisted form of a crawl result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub updated_at: String,
    pub data: Vec<ListingRecord>,
}

impl Snapshot {
    pub fn from_result(result: CrawlResult) -> Self {
        let updated_at = result.generated_at().format(UPDATED_AT_FORMAT).to_string();
        Self {
            updated_at,
            data: result.into_records(),
        }
    }
}

/// Destination for snapshots
pub trait SnapshotSink {
    /// Replaces the stored snapshot with `snapshot`
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), HarvestError>;
}

/// Writes snapshots as pretty-printed UTF-8 JSON
///
/// The file is written beside the target and renamed over it, so readers
/// never observe a half-written snapshot.
#[derive(Debug, Clone)]
pub struct JsonSnapshotWriter {
    path: PathBuf,
}

impl JsonSnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotSink for JsonSnapshotWriter {
    fn write(&mut self, snapshot: &Snapshot) -> Result<(), HarvestError> {
        let json = serde_json::to_string_pretty(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path)?;

        tracing::debug!(
            "Wrote {} records to {}",
            snapshot.data.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Reads a snapshot written by [`JsonSnapshotWriter`]
pub fn load_snapshot(path: &Path) -> Result<Snapshot, HarvestError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
