//! High-level metrics assembly
//!
//! One `fetch` call issues the primary profile lookup plus the secondary
//! lookups (organizations, starred count, contribution totals) and returns
//! either a complete record or a typed error. No partial records are ever
//! produced: every page of every dimension is retrieved first.

use crate::client::http::{RawClient, MEDIA_TYPE_COMMIT_SEARCH};
use crate::client::models::{MetricsRecord, OrgSummary, SearchTotals, UserProfile};
use crate::client::{FetchError, FetchResult};
use crate::config::{ApiConfig, CollectorConfig};
use reqwest::header::LINK;
use serde::de::DeserializeOwned;
use url::Url;

/// The contribution dimensions counted through the search API
#[derive(Debug, Clone, Copy)]
enum ContributionKind {
    PullRequest,
    Issue,
    Commit,
}

/// Client for assembling one metrics record per username
pub struct MetricsClient {
    raw: RawClient,
    per_page: u32,
}

impl MetricsClient {
    /// Builds a client from the API and collector configuration
    ///
    /// A missing token is allowed but logged, since unauthenticated calls
    /// run against much lower rate limits.
    pub fn new(api: &ApiConfig, collector: &CollectorConfig) -> Result<Self, reqwest::Error> {
        let token = api.resolve_token();
        if token.is_none() {
            tracing::warn!("No API token configured; unauthenticated rate limits apply");
        }

        Ok(Self {
            raw: RawClient::new(&api.base_url, token, collector.max_retries)?,
            per_page: collector.per_page,
        })
    }

    /// Fetches the full metrics record for one username
    ///
    /// # Arguments
    ///
    /// * `username` - The account to collect metrics for
    ///
    /// # Returns
    ///
    /// * `Ok(MetricsRecord)` - Every dimension fetched and aggregated
    /// * `Err(FetchError)` - `NotFound` for unknown usernames, `AuthRejected`
    ///   for a bad credential, or a transient failure that outlived its
    ///   retry budget
    pub async fn fetch(&mut self, username: &str) -> FetchResult<MetricsRecord> {
        let profile = self.user_profile(username).await?;
        let organizations = self.organizations(username).await?;
        let starred_repos = self.starred_count(username).await?;
        let total_public_prs = self
            .contribution_total(username, ContributionKind::PullRequest)
            .await?;
        let total_public_issues = self
            .contribution_total(username, ContributionKind::Issue)
            .await?;
        let total_public_commits = self
            .contribution_total(username, ContributionKind::Commit)
            .await?;

        Ok(MetricsRecord {
            username: username.to_string(),
            name: profile.name.unwrap_or_default(),
            public_repos: profile.public_repos,
            followers: profile.followers,
            following: profile.following,
            organizations,
            starred_repos,
            total_public_prs,
            total_public_issues,
            total_public_commits,
        })
    }

    /// Fetches the primary profile for a username
    async fn user_profile(&mut self, username: &str) -> FetchResult<UserProfile> {
        let url = self.raw.endpoint(&format!("users/{}", username));

        let response = match self.raw.get(&url, &[], None).await {
            Ok(response) => response,
            Err(FetchError::Status { status: 404, .. }) => {
                return Err(FetchError::NotFound {
                    username: username.to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        decode(&url, response).await
    }

    /// Collects all organization logins, following pages until a short page
    async fn organizations(&mut self, username: &str) -> FetchResult<Vec<String>> {
        let url = self.raw.endpoint(&format!("users/{}/orgs", username));
        let mut organizations = Vec::new();
        let mut page = 1u32;

        loop {
            let query = [
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ];
            let response = self.raw.get(&url, &query, None).await?;
            let batch: Vec<OrgSummary> = decode(&url, response).await?;
            let batch_len = batch.len();

            organizations.extend(batch.into_iter().map(|org| org.login));

            if batch_len < self.per_page as usize {
                break;
            }
            page += 1;
        }

        Ok(organizations)
    }

    /// Counts starred repositories from the pagination metadata
    ///
    /// Requests a single item per page and reads the `rel="last"` page
    /// number out of the `Link` header, avoiding a fetch of the whole
    /// starred list. Falls back to the body length when the result fits on
    /// one page (no `Link` header).
    async fn starred_count(&mut self, username: &str) -> FetchResult<u64> {
        let url = self.raw.endpoint(&format!("users/{}/starred", username));
        let query = [("per_page", "1".to_string())];
        let response = self.raw.get(&url, &query, None).await?;

        let link = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        if let Some(last) = link.as_deref().and_then(last_page_from_link) {
            return Ok(last);
        }

        let body: Vec<serde_json::Value> = decode(&url, response).await?;
        Ok(body.len() as u64)
    }

    /// Fetches one contribution total from the search API
    async fn contribution_total(
        &mut self,
        username: &str,
        kind: ContributionKind,
    ) -> FetchResult<u64> {
        let (path, accept, q) = match kind {
            ContributionKind::PullRequest => {
                ("search/issues", None, format!("type:pr author:{}", username))
            }
            ContributionKind::Issue => (
                "search/issues",
                None,
                format!("type:issue author:{}", username),
            ),
            // Commit search is still behind its preview media type
            ContributionKind::Commit => (
                "search/commits",
                Some(MEDIA_TYPE_COMMIT_SEARCH),
                format!("author:{}", username),
            ),
        };

        let url = self.raw.endpoint(path);
        let response = self.raw.get(&url, &[("q", q)], accept).await?;
        let totals: SearchTotals = decode(&url, response).await?;
        Ok(totals.total_count)
    }
}

/// Decodes a JSON response body, attributing failures to the endpoint
async fn decode<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> FetchResult<T> {
    response.json::<T>().await.map_err(|e| FetchError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Extracts the `rel="last"` page number from a `Link` header value
fn last_page_from_link(link: &str) -> Option<u64> {
    let last = link.split(',').find(|part| part.contains(r#"rel="last""#))?;
    let target = last
        .split(';')
        .next()?
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>');
    let parsed = Url::parse(target).ok()?;
    let page = parsed
        .query_pairs()
        .find(|(key, _)| key == "page")?
        .1
        .into_owned();
    page.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_from_link() {
        let link = r#"<https://api.github.com/user/123/starred?per_page=1&page=2>; rel="next", <https://api.github.com/user/123/starred?per_page=1&page=178>; rel="last""#;
        assert_eq!(last_page_from_link(link), Some(178));
    }

    #[test]
    fn test_last_page_from_link_single_entry() {
        let link = r#"<https://api.github.com/user/123/starred?page=42>; rel="last""#;
        assert_eq!(last_page_from_link(link), Some(42));
    }

    #[test]
    fn test_last_page_missing_rel_last() {
        let link = r#"<https://api.github.com/user/123/starred?page=2>; rel="next""#;
        assert_eq!(last_page_from_link(link), None);
    }

    #[test]
    fn test_last_page_malformed_target() {
        assert_eq!(last_page_from_link(r#"<not a url>; rel="last""#), None);
        assert_eq!(last_page_from_link(""), None);
    }

    #[test]
    fn test_last_page_without_page_param() {
        let link = r#"<https://api.github.com/user/123/starred?per_page=1>; rel="last""#;
        assert_eq!(last_page_from_link(link), None);
    }
}
