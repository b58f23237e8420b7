//! The sequential fetch-persist-checkpoint loop

use crate::client::{FetchError, MetricsClient};
use crate::config::Config;
use crate::store::{CheckpointStore, ResultSink};
use crate::Result;
use std::path::Path;

/// End-of-run accounting, reported to the user after every run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Usernames fetched and persisted during this run
    pub processed: u64,

    /// Usernames skipped because they were already checkpointed
    pub skipped: u64,

    /// Usernames that failed; not checkpointed, retried next run
    pub failed: u64,
}

/// Drives one fetch-aggregate-persist cycle per username
///
/// Usernames already in the checkpoint store are skipped without an API
/// call. For the rest, the record is appended to the result sink before the
/// username is checkpointed: a crash between the two writes re-fetches at
/// most one username on resume, and never drops a record.
pub struct Engine {
    client: MetricsClient,
    checkpoint: CheckpointStore,
    sink: ResultSink,
    checkpoint_not_found: bool,
}

impl Engine {
    /// Opens the stores and builds the API client
    ///
    /// # Arguments
    ///
    /// * `config` - The collector configuration
    /// * `fresh` - Truncate both output files and start from an empty
    ///   checkpoint set instead of resuming
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` - Ready to run
    /// * `Err(HublensError)` - A store could not be opened or the HTTP
    ///   client could not be built
    pub fn new(config: &Config, fresh: bool) -> Result<Self> {
        let mut checkpoint = CheckpointStore::open(Path::new(&config.output.checkpoint_path))?;
        let mut sink = ResultSink::open(Path::new(&config.output.results_path))?;

        if fresh {
            tracing::info!("Starting fresh: clearing checkpoint and results files");
            checkpoint.clear()?;
            sink.clear()?;
        } else if !checkpoint.is_empty() {
            tracing::info!("Resuming: {} usernames already completed", checkpoint.len());
        }

        let client = MetricsClient::new(&config.api, &config.collector)
            .map_err(FetchError::Network)?;

        Ok(Self {
            client,
            checkpoint,
            sink,
            checkpoint_not_found: config.collector.checkpoint_not_found,
        })
    }

    /// Processes every username in input order and returns the summary
    ///
    /// Per-username failures (`NotFound`, exhausted retries) are logged and
    /// counted without stopping the run. A rejected credential or a store
    /// write failure aborts immediately.
    pub async fn run(&mut self, usernames: &[String]) -> Result<RunSummary> {
        let total = usernames.len();
        let mut summary = RunSummary::default();

        tracing::info!(
            "Loaded {} usernames, {} already completed",
            total,
            self.checkpoint.len()
        );

        for (idx, username) in usernames.iter().enumerate() {
            if self.checkpoint.contains(username) {
                tracing::debug!("Skipping {} (already completed)", username);
                summary.skipped += 1;
                continue;
            }

            tracing::info!("Processing {} ({}/{})", username, idx + 1, total);

            match self.client.fetch(username).await {
                Ok(record) => {
                    // Sink write must be durable before the checkpoint write.
                    self.sink.append(&record)?;
                    self.checkpoint.commit(username)?;
                    summary.processed += 1;
                }
                Err(FetchError::NotFound { .. }) => {
                    tracing::warn!("User {} not found", username);
                    summary.failed += 1;
                    if self.checkpoint_not_found {
                        self.checkpoint.commit(username)?;
                    }
                }
                Err(e @ FetchError::AuthRejected) => {
                    tracing::error!("Aborting run: {}", e);
                    return Err(e.into());
                }
                Err(e) => {
                    tracing::warn!("Failed to process {}: {}", username, e);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            "Run complete: {} processed, {} skipped, {} failed",
            summary.processed,
            summary.skipped,
            summary.failed
        );

        Ok(summary)
    }

    /// Number of usernames currently checkpointed
    pub fn completed_count(&self) -> usize {
        self.checkpoint.len()
    }
}
