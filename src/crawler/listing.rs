//! Listing page parser
//!
//! This module turns one board index page into:
//! - The page `<title>` (used for challenge-page detection)
//! - Candidate posts that pass the sale filter and classify
//! - The "previous page" cursor, if the board has older pages
//!
//! # Entry Rules
//!
//! **Skipped silently:**
//! - Entries without a title anchor (deleted posts)
//! - Titles without the sale marker, or with the reply or announcement marker
//! - Titles that classify as no known category
//!
//! **Reported as parse errors (and skipped):**
//! - Title anchors without an `href`, or with an unresolvable one
//! - Entries without a date

use crate::extract::Taxonomy;
use crate::record::ListingCandidate;
use crate::HarvestError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Visible text of the anchor pointing at the next older page
pub const PREVIOUS_PAGE_LABEL: &str = "‹ 上頁";

/// Extracted information from a listing page
#[derive(Debug)]
pub struct ListingPage {
    /// The page title (from `<title>`)
    pub title: Option<String>,

    /// Posts that survived filtering and classification, top to bottom
    pub candidates: Vec<ListingCandidate>,

    /// Absolute URL of the next older page
    pub previous_page: Option<Url>,

    /// Number of post entries found, before any filtering
    pub entry_count: usize,

    /// Entries that could not be read
    pub parse_errors: Vec<HarvestError>,
}

struct ListingSelectors {
    entry: Selector,
    title_anchor: Selector,
    date: Selector,
    anchor: Selector,
}

impl ListingSelectors {
    fn new() -> Result<Self, String> {
        let parse = |css: &str| Selector::parse(css).map_err(|e| format!("{}: {}", css, e));

        Ok(Self {
            entry: parse("div.r-ent")?,
            title_anchor: parse("div.title > a")?,
            date: parse("div.date")?,
            anchor: parse("a")?,
        })
    }
}

/// Parses a listing page
///
/// # Arguments
///
/// * `html` - The listing page markup
/// * `page_url` - The URL the page was fetched from, used to resolve relative links
/// * `taxonomy` - Category and region tables
///
/// # Example
///
/// ```no_run
/// use macshop_harvest::crawler::parse_listing_page;
/// use macshop_harvest::extract::Taxonomy;
/// use url::Url;
///
/// let html = r#"<div class="r-ent"><div class="title"><a href="/bbs/MacShop/M.1.html">[販售] iPhone 15</a></div><div class="date">1/02</div></div>"#;
/// let url = Url::parse("https://www.ptt.cc/bbs/MacShop/index.html").unwrap();
/// let page = parse_listing_page(html, &url, &Taxonomy::default()).unwrap();
/// assert_eq!(page.candidates.len(), 1);
/// ```
pub fn parse_listing_page(
    html: &str,
    page_url: &Url,
    taxonomy: &Taxonomy,
) -> Result<ListingPage, HarvestError> {
    let selectors = ListingSelectors::new().map_err(|message| HarvestError::HtmlParse {
        url: page_url.to_string(),
        message,
    })?;
    let document = Html::parse_document(html);

    let mut candidates = Vec::new();
    let mut parse_errors = Vec::new();
    let mut entry_count = 0;

    for entry in document.select(&selectors.entry) {
        entry_count += 1;

        match parse_entry(entry, &selectors, page_url) {
            Ok(Some((title, link, date))) => {
                if let Some(candidate) = ListingCandidate::new(&title, &link, &date, taxonomy) {
                    candidates.push(candidate);
                }
            }
            Ok(None) => {}
            Err(message) => parse_errors.push(HarvestError::HtmlParse {
                url: page_url.to_string(),
                message,
            }),
        }
    }

    Ok(ListingPage {
        title: extract_title(&document),
        candidates,
        previous_page: find_previous_page(&document, &selectors, page_url),
        entry_count,
        parse_errors,
    })
}

/// Extracts the page title from markup, if present and non-empty
pub fn page_title(html: &str) -> Option<String> {
    extract_title(&Html::parse_document(html))
}

/// Returns true if `title` contains any of the challenge phrases
///
/// Best-effort: a title without a known phrase does not prove the page is real.
pub fn is_challenge_title(title: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|phrase| title.contains(phrase.as_str()))
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Reads raw title, absolute link, and date from one entry
///
/// `Ok(None)` marks a deleted post (no title anchor).
fn parse_entry(
    entry: ElementRef,
    selectors: &ListingSelectors,
    page_url: &Url,
) -> Result<Option<(String, String, String)>, String> {
    let anchor = match entry.select(&selectors.title_anchor).next() {
        Some(anchor) => anchor,
        None => return Ok(None),
    };

    let title = anchor.text().collect::<String>().trim().to_string();

    let href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| format!("title anchor '{}' has no href", title))?;
    let link = page_url
        .join(href.trim())
        .map_err(|e| format!("cannot resolve href '{}': {}", href, e))?;

    let date = entry
        .select(&selectors.date)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .ok_or_else(|| format!("entry '{}' has no date", title))?;

    Ok(Some((title, link.to_string(), date)))
}

/// Finds the previous-page anchor by its visible label
///
/// The oldest page renders the label without an `href`; that counts as absent.
fn find_previous_page(document: &Html, selectors: &ListingSelectors, page_url: &Url) -> Option<Url> {
    document
        .select(&selectors.anchor)
        .find(|anchor| anchor.text().collect::<String>().trim() == PREVIOUS_PAGE_LABEL)
        .and_then(|anchor| anchor.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
}
