//! Serde models for API payloads and the output record

use serde::{Deserialize, Serialize};

/// Profile payload from `GET /users/{username}`
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
}

/// One organization entry from `GET /users/{username}/orgs`
#[derive(Debug, Clone, Deserialize)]
pub struct OrgSummary {
    pub login: String,
}

/// Count-only view of a `GET /search/*` response
#[derive(Debug, Clone, Deserialize)]
pub struct SearchTotals {
    #[serde(default)]
    pub total_count: u64,
}

/// Aggregated engagement snapshot for one username
///
/// One of these is serialized per line into the results file. Field order
/// is kept stable so reruns produce diffable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub username: String,

    /// Display name; empty when the profile has none
    pub name: String,

    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub organizations: Vec<String>,
    pub starred_repos: u64,
    pub total_public_prs: u64,
    pub total_public_issues: u64,
    pub total_public_commits: u64,
}
