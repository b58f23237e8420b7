//! GitHub API client module
//!
//! This module wraps all remote API access for the collector, including:
//! - A retrying GET helper with rate-limit-aware pacing
//! - Pagination over list endpoints
//! - Serde models for API payloads and the output record
//! - Error classification

mod http;
mod metrics;
mod models;
mod rate_limit;

pub use metrics::MetricsClient;
pub use models::{MetricsRecord, OrgSummary, SearchTotals, UserProfile};
pub use rate_limit::RateLimitState;

use thiserror::Error;

/// Errors surfaced by the metrics client
///
/// Rate limiting is handled inside the client by waiting for the reported
/// reset time, so it never appears here. `NotFound` and the retry-exhaustion
/// variants are per-username; `AuthRejected` invalidates the whole run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("user {username} not found")]
    NotFound { username: String },

    #[error("credential rejected by the API (HTTP 401)")]
    AuthRejected,

    #[error("giving up on {url} after {retries} retries (last status {status})")]
    RetriesExhausted {
        url: String,
        status: u16,
        retries: u32,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Result type alias for client operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;
