use crate::record::Category;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Board the harvester walks when no other URL is configured
pub const DEFAULT_BOARD_URL: &str = "https://www.ptt.cc/bbs/MacShop/index.html";

/// Main configuration structure for MacShop-Harvest
///
/// Every section falls back to its reference values, so an empty TOML file
/// is a complete configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub client: ClientConfig,
    pub rate: RateConfig,
    pub output: OutputConfig,
    pub taxonomy: TaxonomyConfig,
}

/// Traversal behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Newest listing page of the board
    #[serde(rename = "board-url")]
    pub board_url: String,

    /// Maximum number of listing pages to fetch in one run
    #[serde(rename = "page-budget")]
    pub page_budget: u32,

    /// Fetch each post's detail page for its price; when off, prices come from titles
    #[serde(rename = "resolve-details")]
    pub resolve_details: bool,

    /// Smallest number accepted as a real price
    #[serde(rename = "plausibility-threshold")]
    pub plausibility_threshold: u64,

    /// Page title fragments that identify an anti-bot interstitial
    #[serde(rename = "challenge-phrases")]
    pub challenge_phrases: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            board_url: DEFAULT_BOARD_URL.to_string(),
            page_budget: 10,
            resolve_details: true,
            plausibility_threshold: 100,
            challenge_phrases: vec!["Just a moment".to_string(), "Access denied".to_string()],
        }
    }
}

/// Outbound request configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Total attempts per request, including the first one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// First retry delay (milliseconds); doubles on each further attempt
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Pool of user-agent strings; one is picked at random per request
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,
}

impl ClientConfig {
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base_ms: 500,
            timeout_secs: 20,
            connect_timeout_secs: 10,
            user_agents: [
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.5; rv:127.0) Gecko/20100101 Firefox/127.0",
                "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1",
            ]
            .iter()
            .map(|ua| ua.to_string())
            .collect(),
        }
    }
}

/// Inter-request delay configuration (seconds)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateConfig {
    #[serde(rename = "page-delay-min-secs")]
    pub page_delay_min_secs: f64,

    #[serde(rename = "page-delay-max-secs")]
    pub page_delay_max_secs: f64,

    #[serde(rename = "detail-delay-min-secs")]
    pub detail_delay_min_secs: f64,

    #[serde(rename = "detail-delay-max-secs")]
    pub detail_delay_max_secs: f64,
}

impl RateConfig {
    /// A configuration that never sleeps
    pub fn zero() -> Self {
        Self {
            page_delay_min_secs: 0.0,
            page_delay_max_secs: 0.0,
            detail_delay_min_secs: 0.0,
            detail_delay_max_secs: 0.0,
        }
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            page_delay_min_secs: 2.0,
            page_delay_max_secs: 5.0,
            detail_delay_min_secs: 0.5,
            detail_delay_max_secs: 1.5,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the JSON snapshot file
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "data.json".to_string(),
        }
    }
}

/// Classification tables
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    /// Region names scanned in order; the first one found in a title wins
    pub regions: Vec<String>,

    /// Category alias sets scanned in order; the first matching set wins
    pub categories: Vec<CategoryAliases>,
}

/// One row of the category table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryAliases {
    pub category: Category,

    /// Lower-case substrings that identify the category
    pub aliases: Vec<String>,
}

impl CategoryAliases {
    fn new(category: Category, aliases: &[&str]) -> Self {
        Self {
            category,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            regions: [
                "台北", "新北", "桃園", "新竹", "苗栗", "台中", "彰化", "雲林", "嘉義", "台南", "高雄",
                "屏東", "宜蘭", "花蓮", "台東", "基隆", "南投",
            ]
            .iter()
            .map(|r| r.to_string())
            .collect(),
            categories: vec![
                CategoryAliases::new(Category::IPhone, &["iphone"]),
                CategoryAliases::new(Category::IPad, &["ipad"]),
                CategoryAliases::new(Category::MacBook, &["macbook", "mbp", "mba"]),
                CategoryAliases::new(Category::AppleWatch, &["apple watch", "watch"]),
                CategoryAliases::new(Category::AirPods, &["airpods", "airpod"]),
                CategoryAliases::new(Category::HomePod, &["homepod"]),
                CategoryAliases::new(Category::AirTag, &["airtag"]),
                CategoryAliases::new(Category::AppleTv, &["apple tv", "appletv"]),
            ],
        }
    }
}
