//! Durable record of which usernames have been fully processed

use crate::store::{io_error, StoreResult};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Append-only set of completed usernames
///
/// The file is scanned once at open; afterwards membership tests run
/// against the in-memory set and each commit appends a single line.
/// Entries are never rewritten or removed during a run.
pub struct CheckpointStore {
    completed: HashSet<String>,
    file: File,
    path: PathBuf,
}

impl CheckpointStore {
    /// Opens (or creates) the checkpoint file and loads the completed set
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the checkpoint file
    ///
    /// # Returns
    ///
    /// * `Ok(CheckpointStore)` - Store ready for membership tests and commits
    /// * `Err(StoreError)` - The file could not be read or created
    pub fn open(path: &Path) -> StoreResult<Self> {
        let completed = match File::open(path) {
            Ok(file) => load_completed(file).map_err(|e| io_error(path, e))?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(io_error(path, e)),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| io_error(path, e))?;

        Ok(Self {
            completed,
            file,
            path: path.to_path_buf(),
        })
    }

    /// Whether this username has already been fully processed
    pub fn contains(&self, username: &str) -> bool {
        self.completed.contains(username)
    }

    /// Number of completed usernames
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    /// Whether no usernames have been completed yet
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Records a username as fully processed
    ///
    /// The line is synced to disk before this returns. The caller must have
    /// already made the matching result record durable; committing first
    /// would let a crash silently drop that record.
    pub fn commit(&mut self, username: &str) -> StoreResult<()> {
        writeln!(self.file, "{}", username).map_err(|e| io_error(&self.path, e))?;
        self.file.sync_data().map_err(|e| io_error(&self.path, e))?;
        self.completed.insert(username.to_string());
        Ok(())
    }

    /// Discards all completed entries and truncates the file
    pub fn clear(&mut self) -> StoreResult<()> {
        self.file.set_len(0).map_err(|e| io_error(&self.path, e))?;
        self.completed.clear();
        Ok(())
    }
}

/// Reads the completed set from an existing checkpoint file, skipping
/// blank lines
fn load_completed(file: File) -> std::io::Result<HashSet<String>> {
    let mut completed = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            completed.insert(trimmed.to_string());
        }
    }
    Ok(completed)
}
