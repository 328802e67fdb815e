//! Detail page price resolution
//!
//! A missing price is the common case, not a failure: every problem on
//! this path (bad status, transport failure, missing content region, no
//! tagged amount) resolves to [`Price::Pending`].

use crate::crawler::client::ResilientClient;
use crate::extract::extract_tagged_price;
use crate::record::Price;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use scraper::{Html, Selector};

/// Fetches a post and reads its asking price
///
/// # Arguments
///
/// * `client` - The resilient client
/// * `link` - Absolute URL of the post
/// * `referer` - Listing page the post was found on, sent as `Referer`
/// * `threshold` - Smallest number accepted as a price
pub async fn resolve_price(
    client: &ResilientClient,
    link: &str,
    referer: Option<&str>,
    threshold: u64,
) -> Price {
    let mut headers = HeaderMap::new();
    if let Some(value) = referer.and_then(|r| HeaderValue::from_str(r).ok()) {
        headers.insert(REFERER, value);
    }

    let response = match client.fetch(link, &headers).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Detail fetch failed for {}: {}", link, e);
            return Price::Pending;
        }
    };

    if !response.is_success() {
        tracing::debug!("Detail page {} returned HTTP {}", link, response.status);
        return Price::Pending;
    }

    let price = extract_detail_price(&response.body, threshold);
    tracing::debug!("Resolved {} -> {}", link, price);
    price
}

/// Reads the tagged price from the main content region of a post
pub fn extract_detail_price(html: &str, threshold: u64) -> Price {
    match main_content_text(html) {
        Some(text) => extract_tagged_price(&text, threshold),
        None => Price::Pending,
    }
}

fn main_content_text(html: &str) -> Option<String> {
    let selector = Selector::parse("#main-content").ok()?;
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
}
