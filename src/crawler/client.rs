//! Resilient HTTP client
//!
//! This module wraps every outbound request with:
//! - A user agent drawn at random from the configured pool
//! - Per-request and connect timeouts
//! - Bounded retries with exponential backoff for transient failures
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 2xx, 3xx, 4xx | Return immediately |
//! | HTTP 5xx with a challenge-page title | Return immediately |
//! | HTTP 5xx | Retry with backoff |
//! | Timeout | Retry with backoff |
//! | Connection failure / reset | Retry with backoff |
//! | Builder / redirect error | Fail immediately |
//!
//! Backoff starts at the configured base and doubles after each attempt.
//! Exhausting the attempts yields [`HarvestError::RetriesExhausted`].

use crate::config::ClientConfig;
use crate::crawler::listing::{is_challenge_title, page_title};
use crate::HarvestError;
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// A completed HTTP exchange
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client with identity rotation and retry/backoff
#[derive(Debug, Clone)]
pub struct ResilientClient {
    client: Client,
    user_agents: Vec<String>,
    max_attempts: u32,
    backoff_base: Duration,
    challenge_phrases: Vec<String>,
}

impl ResilientClient {
    /// Builds the client from configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use macshop_harvest::config::ClientConfig;
    /// use macshop_harvest::crawler::ResilientClient;
    ///
    /// let client = ResilientClient::new(&ClientConfig::default()).unwrap();
    /// ```
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            user_agents: config.user_agents.clone(),
            max_attempts: config.max_attempts.max(1),
            backoff_base: config.backoff_base(),
            challenge_phrases: Vec::new(),
        })
    }

    /// Title phrases that mark a 5xx response as a challenge page
    ///
    /// Such responses are returned on the first attempt instead of retried.
    pub fn with_challenge_phrases(mut self, phrases: &[String]) -> Self {
        self.challenge_phrases = phrases.to_vec();
        self
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// `extra_headers` are sent on every attempt, after the rotated user agent.
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResponse)` - Any non-5xx response, including 4xx, or a 5xx challenge page
    /// * `Err(HarvestError::RetriesExhausted)` - Every attempt failed transiently
    /// * `Err(HarvestError::Http)` - A failure that retrying cannot fix
    pub async fn fetch(
        &self,
        url: &str,
        extra_headers: &HeaderMap,
    ) -> Result<FetchResponse, HarvestError> {
        let mut last_failure = String::new();

        for attempt in 1..=self.max_attempts {
            match self.try_fetch(url, extra_headers).await {
                Ok(response) if is_retryable_status(response.status) => {
                    if self.is_challenge_page(&response.body) {
                        tracing::debug!("HTTP {} from {} is a challenge page", response.status, url);
                        return Ok(response);
                    }
                    last_failure = format!("HTTP {}", response.status);
                }
                Ok(response) => return Ok(response),
                Err(e) if is_retryable_error(&e) => {
                    last_failure = e.to_string();
                }
                Err(e) => {
                    return Err(HarvestError::Http {
                        url: url.to_string(),
                        source: e,
                    })
                }
            }

            if attempt < self.max_attempts {
                let delay = self.backoff_delay(attempt);
                tracing::warn!(
                    "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                    attempt,
                    self.max_attempts,
                    url,
                    last_failure,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(HarvestError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
            last: last_failure,
        })
    }

    /// Delay before the attempt following `attempt` (1-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1u32 << exponent)
    }

    /// Picks one identity from the pool
    pub fn pick_user_agent(&self) -> Option<&str> {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }

    fn is_challenge_page(&self, body: &str) -> bool {
        !self.challenge_phrases.is_empty()
            && page_title(body).map_or(false, |title| {
                is_challenge_title(&title, &self.challenge_phrases)
            })
    }

    async fn try_fetch(
        &self,
        url: &str,
        extra_headers: &HeaderMap,
    ) -> Result<FetchResponse, reqwest::Error> {
        let mut request = self.client.get(url);
        if let Some(user_agent) = self.pick_user_agent() {
            request = request.header(USER_AGENT, user_agent);
        }

        let response = request.headers(extra_headers.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(FetchResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Server-side errors are worth another try
fn is_retryable_status(status: u16) -> bool {
    StatusCode::from_u16(status)
        .map(|s| s.is_server_error())
        .unwrap_or(false)
}

/// Timeouts and connection-level failures are worth another try
fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> ClientConfig {
        ClientConfig {
            max_attempts: 5,
            backoff_base_ms: 100,
            timeout_secs: 5,
            connect_timeout_secs: 5,
            user_agents: vec!["AgentA/1.0".to_string(), "AgentB/2.0".to_string()],
        }
    }

    #[test]
    fn test_build_client() {
        assert!(ResilientClient::new(&create_test_config()).is_ok());
    }

    #[test]
    fn test_backoff_doubles() {
        let client = ResilientClient::new(&create_test_config()).unwrap();

        assert_eq!(client.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(client.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(client.backoff_delay(3), Duration::from_millis(400));
        assert_eq!(client.backoff_delay(4), Duration::from_millis(800));
    }

    #[test]
    fn test_user_agent_from_pool() {
        let client = ResilientClient::new(&create_test_config()).unwrap();

        for _ in 0..20 {
            let ua = client.pick_user_agent().unwrap();
            assert!(ua == "AgentA/1.0" || ua == "AgentB/2.0");
        }
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(500));
        assert!(is_retryable_status(502));
        assert!(is_retryable_status(503));

        assert!(!is_retryable_status(200));
        assert!(!is_retryable_status(403));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(429));
    }

    #[test]
    fn test_challenge_page_detection() {
        let phrases = vec!["Just a moment".to_string()];
        let plain = ResilientClient::new(&create_test_config()).unwrap();
        let screening = plain.clone().with_challenge_phrases(&phrases);
        let body = "<html><head><title>Just a moment...</title></head></html>";

        assert!(screening.is_challenge_page(body));
        assert!(!screening.is_challenge_page("<html><head><title>Server error</title></head></html>"));
        assert!(!screening.is_challenge_page("Service Unavailable"));
        assert!(!plain.is_challenge_page(body));
    }

    #[test]
    fn test_success_range() {
        let response = |status| FetchResponse {
            status,
            body: String::new(),
        };

        assert!(response(200).is_success());
        assert!(!response(404).is_success());
        assert!(!response(503).is_success());
    }
}
