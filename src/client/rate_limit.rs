//! Rate-limit accounting from API response headers
//!
//! The call budget is never persisted; it is rebuilt from the
//! `X-RateLimit-Remaining` and `X-RateLimit-Reset` headers of every
//! response the client sees.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Extra wait after the reported reset so the window has actually rolled over
const RESET_PAD: Duration = Duration::from_secs(2);

/// Fallback wait when the API reports exhaustion without a reset time
const DEFAULT_RESET_WAIT: u64 = 60;

/// Call budget as reported by the API on the most recent response
#[derive(Debug, Clone, Default)]
pub struct RateLimitState {
    /// Remaining calls in the current window, if the API reported it
    pub remaining: Option<u32>,

    /// Unix timestamp (seconds) at which the window resets
    pub reset_at: Option<u64>,
}

impl RateLimitState {
    /// Creates an empty state with no budget information
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the tracked budget from a response's headers
    ///
    /// A response without rate-limit headers clears the remaining count,
    /// so a stale zero from an earlier response cannot stall the client.
    pub fn update_from_headers(&mut self, headers: &HeaderMap) {
        self.remaining = header_u64(headers, "x-ratelimit-remaining").map(|v| v as u32);
        if let Some(reset) = header_u64(headers, "x-ratelimit-reset") {
            self.reset_at = Some(reset);
        }
    }

    /// Whether the API reported an exhausted call budget
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// How long to sleep until the reported reset time has passed
    ///
    /// Falls back to one minute when no reset time was reported.
    pub fn wait_until_reset(&self) -> Duration {
        let now = unix_now();
        let reset = self.reset_at.unwrap_or(now + DEFAULT_RESET_WAIT);
        Duration::from_secs(reset.saturating_sub(now)) + RESET_PAD
    }

    /// The reset instant as a printable timestamp, for logging
    pub fn reset_instant(&self) -> Option<DateTime<Utc>> {
        self.reset_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs as i64, 0))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}
