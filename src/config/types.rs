use serde::Deserialize;

/// Main configuration structure for hublens
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub collector: CollectorConfig,
}

/// Remote API endpoint and credential configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the GitHub REST API
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// API token attached to every request; falls back to $GITHUB_TOKEN
    #[serde(default)]
    pub token: Option<String>,
}

impl ApiConfig {
    /// Resolves the API token, preferring the config value over the
    /// GITHUB_TOKEN environment variable
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .filter(|token| !token.is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()))
    }
}

/// Input configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Path to the username list file, one username per line
    #[serde(rename = "usernames-path")]
    pub usernames_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON-lines results file
    #[serde(rename = "results-path")]
    pub results_path: String,

    /// Path to the plain-text checkpoint file
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,
}

/// Collector behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Maximum retry attempts for transient request failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Page size for paginated listings (the API caps this at 100)
    #[serde(rename = "per-page", default = "default_per_page")]
    pub per_page: u32,

    /// Whether unknown usernames are checkpointed so later runs skip them
    #[serde(rename = "checkpoint-not-found", default)]
    pub checkpoint_not_found: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            per_page: default_per_page(),
            checkpoint_not_found: false,
        }
    }
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_per_page() -> u32 {
    100
}
