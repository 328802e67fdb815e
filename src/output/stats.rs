//! Statistics over harvested records
//!
//! Used after a run and by `--show` to summarize a snapshot.

use crate::record::{Category, ListingRecord};
use std::collections::BTreeMap;

/// Record counts by category and price state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryBreakdown {
    /// Total number of records
    pub total: usize,

    /// Count of records by category
    pub by_category: BTreeMap<Category, usize>,

    /// Records with a resolved price
    pub priced: usize,

    /// Records whose price is pending
    pub pending: usize,

    /// Records without a region in the title
    pub without_location: usize,
}

impl CategoryBreakdown {
    pub fn from_records(records: &[ListingRecord]) -> Self {
        let mut breakdown = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            *breakdown.by_category.entry(record.category()).or_insert(0) += 1;

            if record.price().is_pending() {
                breakdown.pending += 1;
            } else {
                breakdown.priced += 1;
            }

            if record.location().is_empty() {
                breakdown.without_location += 1;
            }
        }

        breakdown
    }
}

/// Prints a breakdown to stdout in a formatted manner
pub fn print_breakdown(breakdown: &CategoryBreakdown) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Total listings: {}", breakdown.total);
    println!("  With price: {}", breakdown.priced);
    println!("  Price pending: {}", breakdown.pending);
    println!("  Without location: {}", breakdown.without_location);
    println!();

    println!("Listings by Category:");
    // Sort categories by count (descending)
    let mut counts: Vec<_> = breakdown.by_category.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1));

    for (category, count) in counts {
        let percentage = if breakdown.total > 0 {
            (*count as f64 / breakdown.total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", category, count, percentage);
    }
    println!();
}
