use crate::config::types::{
    CategoryAliases, ClientConfig, Config, CrawlerConfig, OutputConfig, RateConfig,
    TaxonomyConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_client_config(&config.client)?;
    validate_rate_config(&config.rate)?;
    validate_output_config(&config.output)?;
    validate_taxonomy(&config.taxonomy)?;
    Ok(())
}

/// Validates traversal configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.board_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid board-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "board-url '{}' must use HTTP(S)",
            config.board_url
        )));
    }

    if config.page_budget < 1 {
        return Err(ConfigError::Validation(
            "page-budget must be >= 1".to_string(),
        ));
    }

    if config
        .challenge_phrases
        .iter()
        .any(|phrase| phrase.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "challenge-phrases cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates outbound request configuration
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "max-attempts must be >= 1".to_string(),
        ));
    }

    // Keeps the doubling backoff well inside u32 shifts
    if config.max_attempts > 16 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be <= 16, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs < 1 || config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs and connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user-agents must contain at least one entry".to_string(),
        ));
    }

    if let Some(bad) = config
        .user_agents
        .iter()
        .find(|ua| ua.trim().is_empty() || reqwest::header::HeaderValue::from_str(ua).is_err())
    {
        return Err(ConfigError::Validation(format!(
            "user-agent '{}' is not a valid header value",
            bad
        )));
    }

    Ok(())
}

/// Longest pause the governor may be asked to take
const MAX_DELAY_SECS: f64 = 3600.0;

/// Validates delay intervals
fn validate_rate_config(config: &RateConfig) -> Result<(), ConfigError> {
    validate_interval(
        "page-delay",
        config.page_delay_min_secs,
        config.page_delay_max_secs,
    )?;
    validate_interval(
        "detail-delay",
        config.detail_delay_min_secs,
        config.detail_delay_max_secs,
    )?;
    Ok(())
}

fn validate_interval(name: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} bounds must be finite and non-negative, got {}..{}",
            name, min, max
        )));
    }

    if max > MAX_DELAY_SECS {
        return Err(ConfigError::Validation(format!(
            "{}-max-secs ({}) exceeds the {} second limit",
            name, max, MAX_DELAY_SECS
        )));
    }

    if min > max {
        return Err(ConfigError::Validation(format!(
            "{}-min-secs ({}) exceeds {}-max-secs ({})",
            name, min, name, max
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the classification tables
fn validate_taxonomy(config: &TaxonomyConfig) -> Result<(), ConfigError> {
    if config.regions.iter().any(|r| r.is_empty()) {
        return Err(ConfigError::Validation(
            "regions cannot contain empty names".to_string(),
        ));
    }

    for row in &config.categories {
        validate_alias_set(row)?;
    }

    Ok(())
}

/// Alias sets are matched against lower-cased titles, so they must be lower-case themselves
fn validate_alias_set(row: &CategoryAliases) -> Result<(), ConfigError> {
    if row.aliases.is_empty() {
        return Err(ConfigError::Validation(format!(
            "category '{}' must have at least one alias",
            row.category
        )));
    }

    for alias in &row.aliases {
        if alias.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' has an empty alias",
                row.category
            )));
        }

        if alias.to_lowercase() != *alias {
            return Err(ConfigError::Validation(format!(
                "alias '{}' for category '{}' must be lower-case",
                alias, row.category
            )));
        }
    }

    Ok(())
}
