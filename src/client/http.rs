//! Low-level HTTP access to the API
//!
//! This module owns the single retry loop every API call goes through:
//! - Rate-limit exhaustion (403/429 with a zero remaining budget) sleeps
//!   until the reported reset time, then retries with a fresh retry budget
//! - Server errors and transport failures retry with exponential backoff
//! - 401 and 404 are classified immediately, without retrying

use crate::client::rate_limit::RateLimitState;
use crate::client::{FetchError, FetchResult};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

/// Default media type for API requests
pub(crate) const MEDIA_TYPE_JSON: &str = "application/vnd.github+json";

/// Media type required by the commit search endpoint
pub(crate) const MEDIA_TYPE_COMMIT_SEARCH: &str = "application/vnd.github.cloak-preview+json";

/// Builds the HTTP client used for all API calls
pub(crate) fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A thin client around one API host: base URL, credential, retry policy,
/// and the transient rate-limit state
pub(crate) struct RawClient {
    http: Client,
    base: String,
    token: Option<String>,
    max_retries: u32,
    rate_limit: RateLimitState,
}

impl RawClient {
    pub(crate) fn new(
        base_url: &str,
        token: Option<String>,
        max_retries: u32,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: build_http_client()?,
            base: base_url.trim_end_matches('/').to_string(),
            token,
            max_retries,
            rate_limit: RateLimitState::new(),
        })
    }

    /// Builds a full endpoint URL from a path relative to the API base
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    /// Issues a GET request, handling rate limits and transient failures
    ///
    /// Blocks (asynchronously) across rate-limit windows: when the API
    /// reports an exhausted budget the call sleeps until the reset time and
    /// tries again, so the caller only ever sees a definitive outcome.
    pub(crate) async fn get(
        &mut self,
        url: &str,
        query: &[(&str, String)],
        accept: Option<&'static str>,
    ) -> FetchResult<Response> {
        let mut retries = 0u32;

        loop {
            let mut request = self
                .http
                .get(url)
                .header(ACCEPT, accept.unwrap_or(MEDIA_TYPE_JSON));
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(token) = &self.token {
                request = request.header(AUTHORIZATION, format!("token {}", token));
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    if retries < self.max_retries {
                        let wait = backoff_delay(retries);
                        tracing::warn!("Network error on {}: {}. Retrying in {:?}", url, e, wait);
                        tokio::time::sleep(wait).await;
                        retries += 1;
                        continue;
                    }
                    return Err(FetchError::Network(e));
                }
            };

            self.rate_limit.update_from_headers(response.headers());
            let status = response.status();

            // An exhausted budget is a pause, not a failure. The retry
            // counter starts over once the window resets.
            if (status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS)
                && self.rate_limit.is_exhausted()
            {
                let wait = self.rate_limit.wait_until_reset();
                match self.rate_limit.reset_instant() {
                    Some(at) => {
                        tracing::info!("Rate limit exhausted; sleeping {:?} (until {})", wait, at);
                    }
                    None => tracing::info!("Rate limit exhausted; sleeping {:?}", wait),
                }
                tokio::time::sleep(wait).await;
                retries = 0;
                continue;
            }

            if status.is_server_error() || status == StatusCode::FORBIDDEN {
                if retries < self.max_retries {
                    let wait = backoff_delay(retries);
                    tracing::warn!("HTTP {} on {}. Retrying in {:?}", status, url, wait);
                    tokio::time::sleep(wait).await;
                    retries += 1;
                    continue;
                }
                return Err(FetchError::RetriesExhausted {
                    url: url.to_string(),
                    status: status.as_u16(),
                    retries,
                });
            }

            if status == StatusCode::UNAUTHORIZED {
                return Err(FetchError::AuthRejected);
            }

            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            return Ok(response);
        }
    }
}

/// Exponential backoff: 1s, 2s, 4s, ... per retry attempt
fn backoff_delay(retries: u32) -> Duration {
    Duration::from_secs(1u64 << retries.min(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let client = RawClient::new("https://api.github.com/", None, 3).unwrap();
        assert_eq!(
            client.endpoint("users/octocat"),
            "https://api.github.com/users/octocat"
        );
    }

    #[test]
    fn test_backoff_delay_doubles() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(3), Duration::from_secs(8));
        // Capped so a large retry budget cannot produce absurd waits
        assert_eq!(backoff_delay(10), Duration::from_secs(64));
    }
}
