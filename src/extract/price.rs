//! Price extraction from post text
//!
//! The detail body is authoritative: a price counts only when it follows a
//! `[售價]` or `[欲售價格]` tag. Bare digit runs in titles are too easily
//! model numbers, so title extraction is only a fallback for runs that skip
//! detail pages.

use crate::record::Price;
use lazy_regex::regex_captures;

/// Finds the tagged price in a detail body
///
/// Accepts an optional half- or full-width colon after the tag and an
/// optional `$` / `NT$` sigil before the amount. The amount token keeps its
/// thousands separators until normalization, so `$3,300` reads as 3300.
pub fn extract_tagged_price(body: &str, threshold: u64) -> Price {
    match regex_captures!(
        r"\[(?:欲售價格|售價)\]\s*[:：]?\s*(?:NT)?\$?\s*([0-9][0-9,]*)",
        body
    ) {
        Some((_, token)) => Price::normalize(token, threshold),
        None => Price::Pending,
    }
}

/// Reads a price from a title
///
/// A `$`-prefixed amount is preferred; otherwise the first digit run is used.
pub fn extract_title_price(title: &str, threshold: u64) -> Price {
    let token = regex_captures!(r"\$\s?([0-9][0-9,]*)", title)
        .or_else(|| regex_captures!(r"([0-9][0-9,]*)", title))
        .map(|(_, token)| token);

    match token {
        Some(token) => Price::normalize(token, threshold),
        None => Price::Pending,
    }
}
