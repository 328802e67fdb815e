/// Crawl phase definitions for the pagination loop
///
/// The controller walks these phases once per listing page and must
/// finish every detail fetch of a page before it paginates.
use std::fmt;

/// Represents where the pagination loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Requesting the listing page at the current cursor
    FetchingList,

    /// Turning the listing markup into candidates and a previous-page cursor
    ParsingList,

    /// Fetching detail pages for the page's candidates, one at a time
    ResolvingDetails,

    /// Deciding whether to follow the previous-page cursor
    Paginating,

    // ===== Terminal Phase =====
    /// Traversal has stopped
    Terminated,
}

impl CrawlPhase {
    /// Returns true once traversal has stopped
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Returns true if the loop may move from this phase to `next`
    ///
    /// Every active phase may terminate; otherwise the loop only moves forward,
    /// and `Paginating` loops back to `FetchingList`.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        if self.is_terminal() {
            return false;
        }

        match (self, next) {
            (_, Terminated) => true,
            (FetchingList, ParsingList) => true,
            (ParsingList, ResolvingDetails) => true,
            (ResolvingDetails, Paginating) => true,
            (Paginating, FetchingList) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchingList => "fetching_list",
            Self::ParsingList => "parsing_list",
            Self::ResolvingDetails => "resolving_details",
            Self::Paginating => "paginating",
            Self::Terminated => "terminated",
        }
    }
}

impl Default for CrawlPhase {
    fn default() -> Self {
        Self::FetchingList
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
