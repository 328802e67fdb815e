//! Pagination controller - main traversal logic
//!
//! The controller walks the board from its newest page towards older pages:
//! - Fetches a listing page and checks it is not a challenge page
//! - Parses it into candidates and a previous-page cursor
//! - Resolves every candidate's price, one detail page at a time
//! - Follows the cursor until the page budget, the oldest page, or a failure stops it
//!
//! Everything is sequential. The only waits are the rate governor's pauses
//! and the client's backoff.

use crate::config::Config;
use crate::crawler::client::{FetchResponse, ResilientClient};
use crate::crawler::detail::resolve_price;
use crate::crawler::governor::RateGovernor;
use crate::crawler::listing::{is_challenge_title, parse_listing_page};
use crate::extract::{extract_title_price, Taxonomy};
use crate::record::{CrawlResult, ListingCandidate, Price};
use crate::state::CrawlPhase;
use crate::HarvestError;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use url::Url;

/// Why traversal stopped
#[derive(Debug)]
pub enum Termination {
    /// The configured number of pages was fetched
    PageBudgetExhausted,

    /// The last page fetched had no previous-page link
    NoPreviousPage,

    /// A challenge page was served instead of the listing
    Blocked { url: String, title: String },

    /// A listing page could not be fetched or came back with a bad status
    FetchFailed(HarvestError),
}

impl Termination {
    /// Returns true if traversal ended without a failure
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::PageBudgetExhausted | Self::NoPreviousPage)
    }

    /// Returns true if traversal ended on a challenge page
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }
}

/// Outcome of one traversal
#[derive(Debug)]
pub struct CrawlReport {
    /// Records gathered, in discovery order
    pub result: CrawlResult,

    /// Why traversal stopped
    pub termination: Termination,

    /// Listing pages fetched successfully
    pub pages_fetched: u32,

    /// Entries skipped because their markup could not be read
    pub candidates_skipped: usize,
}

/// Drives the page-by-page traversal
pub struct PaginationController {
    client: ResilientClient,
    governor: RateGovernor,
    taxonomy: Taxonomy,
    board_url: Url,
    page_budget: u32,
    resolve_details: bool,
    threshold: u64,
    challenge_phrases: Vec<String>,
    phase: CrawlPhase,
}

impl PaginationController {
    /// Creates a controller from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(PaginationController)` - Ready to run
    /// * `Err(HarvestError)` - The board URL is invalid or the HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let client = ResilientClient::new(&config.client)?;
        let governor = RateGovernor::new(&config.rate);
        Self::with_parts(config, client, governor)
    }

    /// Creates a controller around an existing client and governor
    pub fn with_parts(
        config: &Config,
        client: ResilientClient,
        governor: RateGovernor,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            client: client.with_challenge_phrases(&config.crawler.challenge_phrases),
            governor,
            taxonomy: Taxonomy::from_config(&config.taxonomy),
            board_url: Url::parse(&config.crawler.board_url)?,
            page_budget: config.crawler.page_budget,
            resolve_details: config.crawler.resolve_details,
            threshold: config.crawler.plausibility_threshold,
            challenge_phrases: config.crawler.challenge_phrases.clone(),
            phase: CrawlPhase::default(),
        })
    }

    /// Current phase of the loop
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the traversal to completion
    ///
    /// Page failures end the traversal but are not returned as errors; they
    /// are reported through [`CrawlReport::termination`] and the records
    /// gathered before them are kept.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Traversal finished (cleanly or not)
    /// * `Err(HarvestError)` - The controller was already used, or its phase bookkeeping broke
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        if self.phase != CrawlPhase::FetchingList {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: CrawlPhase::FetchingList,
            });
        }

        tracing::info!("Start harvesting from: {}", self.board_url);

        let mut result = CrawlResult::new();
        let mut cursor = self.board_url.clone();
        let mut referer: Option<Url> = None;
        let mut pages_fetched = 0u32;
        let mut candidates_skipped = 0usize;

        let termination = loop {
            if pages_fetched >= self.page_budget {
                tracing::info!("Page budget of {} reached", self.page_budget);
                break Termination::PageBudgetExhausted;
            }

            if pages_fetched > 0 {
                self.governor.before_each_page_fetch().await;
            }

            tracing::info!("Processing page {}: {}", pages_fetched + 1, cursor);
            let response = match self.fetch_listing(&cursor, referer.as_ref()).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("Stopping traversal: {}", e);
                    break Termination::FetchFailed(e);
                }
            };

            self.advance(CrawlPhase::ParsingList)?;
            let page = parse_listing_page(&response.body, &cursor, &self.taxonomy)?;
            tracing::debug!("Page title: {}", page.title.as_deref().unwrap_or("No Title"));

            if let Some(title) = page
                .title
                .as_deref()
                .filter(|t| is_challenge_title(t, &self.challenge_phrases))
            {
                tracing::warn!("Stopping traversal: challenge page at {} ({})", cursor, title);
                break Termination::Blocked {
                    url: cursor.to_string(),
                    title: title.to_string(),
                };
            }

            if !response.is_success() {
                let error = HarvestError::Status {
                    url: cursor.to_string(),
                    status: response.status,
                };
                tracing::warn!("Stopping traversal: {}", error);
                break Termination::FetchFailed(error);
            }
            pages_fetched += 1;
            tracing::info!(
                "Found {} entries ({} candidates) on {}",
                page.entry_count,
                page.candidates.len(),
                cursor
            );

            if page.entry_count == 0 {
                tracing::warn!(
                    "No entries found on {}; the markup may have changed or the request was soft-blocked",
                    cursor
                );
            }

            for error in &page.parse_errors {
                tracing::warn!("Skipping entry: {}", error);
            }
            candidates_skipped += page.parse_errors.len();

            self.advance(CrawlPhase::ResolvingDetails)?;
            for candidate in page.candidates {
                let price = self.price_for(&candidate, &cursor).await;
                result.push(candidate.into_record(price));
            }

            self.advance(CrawlPhase::Paginating)?;
            match page.previous_page {
                Some(previous) => {
                    referer = Some(std::mem::replace(&mut cursor, previous));
                    self.advance(CrawlPhase::FetchingList)?;
                }
                None => {
                    tracing::info!("No more pages after {}", cursor);
                    break Termination::NoPreviousPage;
                }
            }
        };

        self.advance(CrawlPhase::Terminated)?;
        tracing::info!(
            "Traversal finished after {} pages with {} records ({:?})",
            pages_fetched,
            result.len(),
            termination
        );

        Ok(CrawlReport {
            result,
            termination,
            pages_fetched,
            candidates_skipped,
        })
    }

    /// Fetches a listing page, sending the newer page as referer
    async fn fetch_listing(
        &self,
        url: &Url,
        referer: Option<&Url>,
    ) -> Result<FetchResponse, HarvestError> {
        let mut headers = HeaderMap::new();
        if let Some(value) = referer.and_then(|r| HeaderValue::from_str(r.as_str()).ok()) {
            headers.insert(REFERER, value);
        }

        self.client.fetch(url.as_str(), &headers).await
    }

    async fn price_for(&self, candidate: &ListingCandidate, listing_url: &Url) -> Price {
        if !self.resolve_details {
            return extract_title_price(candidate.title(), self.threshold);
        }

        self.governor.before_each_detail_fetch().await;
        resolve_price(
            &self.client,
            candidate.link(),
            Some(listing_url.as_str()),
            self.threshold,
        )
        .await
    }

    fn advance(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}
