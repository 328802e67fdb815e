use crate::extract::Taxonomy;
use crate::record::Price;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag a title must carry to be a for-sale post
pub const SALE_MARKER: &str = "[販售]";

/// Prefix of reply posts
pub const REPLY_MARKER: &str = "Re:";

/// Tag of board announcements
pub const ANNOUNCEMENT_MARKER: &str = "公告";

/// Product category of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "iPhone")]
    IPhone,

    #[serde(rename = "iPad")]
    IPad,

    #[serde(rename = "MacBook")]
    MacBook,

    #[serde(rename = "Apple Watch")]
    AppleWatch,

    #[serde(rename = "AirPods")]
    AirPods,

    #[serde(rename = "HomePod")]
    HomePod,

    #[serde(rename = "AirTag")]
    AirTag,

    #[serde(rename = "Apple TV")]
    AppleTv,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IPhone => "iPhone",
            Self::IPad => "iPad",
            Self::MacBook => "MacBook",
            Self::AppleWatch => "Apple Watch",
            Self::AirPods => "AirPods",
            Self::HomePod => "HomePod",
            Self::AirTag => "AirTag",
            Self::AppleTv => "Apple TV",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if a raw title belongs to a for-sale post
///
/// Plain, case-sensitive containment on the three fixed markers.
pub fn passes_title_filter(title: &str) -> bool {
    title.contains(SALE_MARKER)
        && !title.contains(REPLY_MARKER)
        && !title.contains(ANNOUNCEMENT_MARKER)
}

/// A post that passed the title filter and classified, still waiting for its price
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCandidate {
    title: String,
    link: String,
    date: String,
    category: Category,
    location: String,
}

impl ListingCandidate {
    /// Builds a candidate from one board entry
    ///
    /// Returns `None` when the title fails the sale filter or classifies as
    /// none of the known categories.
    pub fn new(title: &str, link: &str, date: &str, taxonomy: &Taxonomy) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() || !passes_title_filter(title) {
            return None;
        }

        let category = taxonomy.classify(title)?;
        let location = taxonomy.locate(title).unwrap_or_default().to_string();

        Some(Self {
            title: title.to_string(),
            link: link.to_string(),
            date: date.trim().to_string(),
            category,
            location,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Finalizes the candidate with its price
    pub fn into_record(self, price: Price) -> ListingRecord {
        ListingRecord {
            title: self.title,
            link: self.link,
            date: self.date,
            category: self.category,
            location: self.location,
            price,
        }
    }
}

/// One for-sale post as written to the snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    title: String,
    link: String,
    date: String,
    category: Category,
    location: String,
    price: Price,
}

impl ListingRecord {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Board display date (e.g. `11/15`), kept verbatim
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Region named in the title, or empty
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn price(&self) -> Price {
        self.price
    }
}
