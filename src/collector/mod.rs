//! Collection engine and input handling
//!
//! This module contains the core collection logic:
//! - Reading the username list
//! - The sequential fetch-persist-checkpoint loop
//! - Skip/resume semantics against the checkpoint store

mod engine;
mod input;

pub use engine::{Engine, RunSummary};
pub use input::read_usernames;

use crate::config::Config;
use crate::Result;
use std::path::Path;

/// Runs a complete collection pass over the configured username list
///
/// This is the main entry point for a run. It will:
/// 1. Read the username list from the configured path
/// 2. Open the checkpoint store and result sink (resuming unless `fresh`)
/// 3. Fetch, persist, and checkpoint each unprocessed username in order
/// 4. Return the end-of-run summary
///
/// # Arguments
///
/// * `config` - The collector configuration
/// * `fresh` - Discard previous checkpoint and results before running
///
/// # Returns
///
/// * `Ok(RunSummary)` - Counts of processed, skipped, and failed usernames
/// * `Err(HublensError)` - A fatal configuration, credential, or
///   persistence failure
pub async fn collect(config: &Config, fresh: bool) -> Result<RunSummary> {
    let usernames = read_usernames(Path::new(&config.input.usernames_path))?;
    let mut engine = Engine::new(config, fresh)?;
    engine.run(&usernames).await
}
