//! Configuration module for MacShop-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a reference default, so the harvester also runs with no file at all.
//!
//! # Example
//!
//! ```no_run
//! use macshop_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvester will walk {} pages", config.crawler.page_budget);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CategoryAliases, ClientConfig, Config, CrawlerConfig, OutputConfig, RateConfig,
    TaxonomyConfig, DEFAULT_BOARD_URL,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate;
