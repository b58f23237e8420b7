//! JSON-lines result sink

use crate::client::MetricsRecord;
use crate::store::{io_error, StoreResult};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only sink of metrics records, one JSON object per line
///
/// Each line is independently parseable, so the file can be consumed as a
/// stream without loading it whole.
pub struct ResultSink {
    file: File,
    path: PathBuf,
}

impl ResultSink {
    /// Opens (or creates) the results file for appending
    pub fn open(path: &Path) -> StoreResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| io_error(path, e))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Appends one record as a single JSON line
    ///
    /// The line is synced to disk before this returns; the checkpoint
    /// commit for the same username must happen only after this succeeds.
    pub fn append(&mut self, record: &MetricsRecord) -> StoreResult<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.file, "{}", line).map_err(|e| io_error(&self.path, e))?;
        self.file.sync_data().map_err(|e| io_error(&self.path, e))?;
        Ok(())
    }

    /// Discards all previously written records
    pub fn clear(&mut self) -> StoreResult<()> {
        self.file.set_len(0).map_err(|e| io_error(&self.path, e))
    }
}
