//! Crawler module for board traversal
//!
//! This module contains the crawl pipeline, including:
//! - HTTP fetching with identity rotation and retry/backoff
//! - Randomized pauses between requests
//! - Listing page parsing and detail page price resolution
//! - The pagination loop that ties them together

mod client;
mod controller;
mod detail;
mod governor;
mod listing;

pub use client::{FetchResponse, ResilientClient};
pub use controller::{CrawlReport, PaginationController, Termination};
pub use detail::{extract_detail_price, resolve_price};
pub use governor::{DelayRange, RateGovernor};
pub use listing::{
    is_challenge_title, page_title, parse_listing_page, ListingPage, PREVIOUS_PAGE_LABEL,
};

use crate::config::Config;
use crate::HarvestError;

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP client and rate governor
/// 2. Walk listing pages from the newest one backwards
/// 3. Resolve prices for every kept post
/// 4. Report the records and why traversal stopped
///
/// # Example
///
/// ```no_run
/// use macshop_harvest::config::Config;
/// use macshop_harvest::crawler::harvest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = harvest(&Config::default()).await?;
/// println!("{} records", report.result.len());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: &Config) -> Result<CrawlReport, HarvestError> {
    let mut controller = PaginationController::new(config)?;
    controller.run().await
}
