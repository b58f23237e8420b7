//! Append-only persistence for results and checkpoints
//!
//! Two flat files back the resume mechanism:
//! - the checkpoint file, one completed username per line
//! - the results file, one JSON record per line
//!
//! Both are written by a single sequential writer. Every record append is
//! made durable before the matching checkpoint line is written, so a crash
//! between the two re-fetches at most one username and never loses a record.

mod checkpoint;
mod results;

pub use checkpoint::CheckpointStore;
pub use results::ResultSink;

use std::path::Path;
use thiserror::Error;

/// Errors from the checkpoint store or result sink
///
/// These are fatal to a run: once a store write fails, the resume
/// bookkeeping can no longer be trusted.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
