//! Rate governor for keeping the request rate low
//!
//! Every listing page and every detail page is preceded by a randomized
//! pause. Page pauses are drawn from a longer interval than detail pauses.
//! These pauses are the only deliberate latency in a run; a zero-width
//! interval at zero disables them.

use crate::config::RateConfig;
use rand::Rng;
use std::time::Duration;

/// Longest single pause, in seconds
pub const MAX_PAUSE_SECS: f64 = 3600.0;

/// A closed interval of pause lengths, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    min_secs: f64,
    max_secs: f64,
}

impl DelayRange {
    /// Creates a range; bounds are clamped to `0..=MAX_PAUSE_SECS` and ordered
    pub fn from_secs(min_secs: f64, max_secs: f64) -> Self {
        let min_secs = min_secs.max(0.0).min(MAX_PAUSE_SECS);
        Self {
            min_secs,
            max_secs: max_secs.max(min_secs).min(MAX_PAUSE_SECS),
        }
    }

    pub fn zero() -> Self {
        Self::from_secs(0.0, 0.0)
    }

    /// Draws a pause uniformly from the range
    pub fn sample(&self) -> Duration {
        let secs = if self.max_secs > self.min_secs {
            rand::thread_rng().gen_range(self.min_secs..=self.max_secs)
        } else {
            self.min_secs
        };
        Duration::from_secs_f64(secs)
    }
}

/// Injects randomized pauses before page and detail fetches
#[derive(Debug, Clone)]
pub struct RateGovernor {
    page: DelayRange,
    detail: DelayRange,
}

impl RateGovernor {
    pub fn new(config: &RateConfig) -> Self {
        Self {
            page: DelayRange::from_secs(config.page_delay_min_secs, config.page_delay_max_secs),
            detail: DelayRange::from_secs(
                config.detail_delay_min_secs,
                config.detail_delay_max_secs,
            ),
        }
    }

    /// A governor that never pauses
    pub fn unthrottled() -> Self {
        Self {
            page: DelayRange::zero(),
            detail: DelayRange::zero(),
        }
    }

    /// Suspends the caller before a listing page request
    pub async fn before_each_page_fetch(&self) {
        pause(self.page.sample(), "page").await;
    }

    /// Suspends the caller before a detail page request
    pub async fn before_each_detail_fetch(&self) {
        pause(self.detail.sample(), "detail").await;
    }
}

async fn pause(delay: Duration, kind: &str) {
    if delay.is_zero() {
        return;
    }

    tracing::trace!("Pausing {:?} before {} fetch", delay, kind);
    tokio::time::sleep(delay).await;
}
