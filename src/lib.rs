//! Hublens: a resumable GitHub engagement metrics collector
//!
//! This crate fetches public engagement metrics (repositories, followers,
//! organizations, starred repositories, contribution totals) for a list of
//! usernames from the GitHub REST API, writing one JSON record per user to
//! an append-only results file. A plain-text checkpoint file records which
//! usernames are done, so an interrupted run resumes without re-fetching.

pub mod client;
pub mod collector;
pub mod config;
pub mod store;

use thiserror::Error;

/// Main error type for hublens operations
#[derive(Debug, Error)]
pub enum HublensError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Fetch(#[from] client::FetchError),

    #[error("Persistence error: {0}")]
    Store(#[from] store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for hublens operations
pub type Result<T> = std::result::Result<T, HublensError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{FetchError, MetricsClient, MetricsRecord};
pub use collector::{collect, Engine, RunSummary};
pub use config::Config;
pub use store::{CheckpointStore, ResultSink, StoreError};
