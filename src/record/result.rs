use crate::record::ListingRecord;
use chrono::{DateTime, Local};

/// Records harvested by one run, in discovery order
#[derive(Debug, Clone)]
pub struct CrawlResult {
    records: Vec<ListingRecord>,
    generated_at: DateTime<Local>,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self::with_timestamp(Local::now())
    }

    pub fn with_timestamp(generated_at: DateTime<Local>) -> Self {
        Self {
            records: Vec::new(),
            generated_at,
        }
    }

    /// Appends a record after every record already held
    pub fn push(&mut self, record: ListingRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ListingRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generated_at(&self) -> DateTime<Local> {
        self.generated_at
    }
}

impl Default for CrawlResult {
    fn default() -> Self {
        Self::new()
    }
}
