//! Classifiers and extractors that turn post text into structured fields
//!
//! - `taxonomy`: category lookup over a data-driven alias table
//! - `location`: gazetteer scan for region names
//! - `price`: tag-anchored price extraction with a plausibility threshold

mod location;
mod price;
mod taxonomy;

pub use location::find_region;
pub use price::{extract_tagged_price, extract_title_price};
pub use taxonomy::{first_matching_set, Taxonomy};
