//! Harvested data types
//!
//! - `ListingCandidate`: a filtered, classified post that still needs its price
//! - `ListingRecord`: the finished post, built exactly once from a candidate
//! - `CrawlResult`: the ordered records of one run
//! - `Price`: a normalized amount or the pending sentinel

mod listing;
mod price;
mod result;

pub use listing::{
    passes_title_filter, Category, ListingCandidate, ListingRecord, ANNOUNCEMENT_MARKER,
    REPLY_MARKER, SALE_MARKER,
};
pub use price::{Price, PRICE_PENDING};
pub use result::CrawlResult;
