//! State module for tracking traversal progress
//!
//! # Components
//!
//! - `CrawlPhase`: the phase of the pagination loop (fetching, parsing, resolving details, paginating, terminated)

mod crawl_phase;

// Re-export main types
pub use crawl_phase::CrawlPhase;
