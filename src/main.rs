//! Hublens main entry point
//!
//! This is the command-line interface for the hublens metrics collector.

use anyhow::Context;
use clap::Parser;
use hublens::collector::{collect, read_usernames};
use hublens::config::{load_config_with_hash, Config};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Hublens: a resumable GitHub engagement metrics collector
///
/// Hublens fetches public engagement metrics for a list of usernames and
/// appends one JSON record per user to a results file. Completed usernames
/// are checkpointed, so an interrupted run picks up where it left off.
#[derive(Parser, Debug)]
#[command(name = "hublens")]
#[command(version = "1.0.0")]
#[command(about = "A resumable GitHub engagement metrics collector", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume from the existing checkpoint file (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start over, discarding the previous checkpoint and results
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be collected without calling the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_collect(&config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hublens=info,warn"),
            1 => EnvFilter::new("hublens=debug,info"),
            2 => EnvFilter::new("hublens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the collection plan
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Hublens Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    println!(
        "  Token: {}",
        if config.api.resolve_token().is_some() {
            "configured"
        } else {
            "not configured (unauthenticated rate limits apply)"
        }
    );

    println!("\nCollector:");
    println!("  Max retries: {}", config.collector.max_retries);
    println!("  Page size: {}", config.collector.per_page);
    println!(
        "  Checkpoint not-found users: {}",
        config.collector.checkpoint_not_found
    );

    println!("\nInput:");
    println!("  Usernames: {}", config.input.usernames_path);

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);
    println!("  Checkpoint: {}", config.output.checkpoint_path);

    let usernames = read_usernames(Path::new(&config.input.usernames_path))
        .with_context(|| format!("failed to read {}", config.input.usernames_path))?;
    let completed = load_completed_for_report(Path::new(&config.output.checkpoint_path));
    let pending = usernames
        .iter()
        .filter(|username| !completed.contains(username.as_str()))
        .count();

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would process {} of {} usernames ({} already completed)",
        pending,
        usernames.len(),
        completed.len()
    );

    Ok(())
}

/// Reads the checkpoint file for dry-run reporting, without creating it
fn load_completed_for_report(path: &Path) -> HashSet<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => HashSet::new(),
    }
}

/// Handles the main collection operation
async fn handle_collect(config: &Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh run (ignoring previous checkpoint)");
    } else {
        tracing::info!("Starting run (will resume from checkpoint if present)");
    }

    let summary = collect(config, fresh).await?;

    println!("\n=== Collection Summary ===");
    println!("  Processed: {}", summary.processed);
    println!("  Skipped:   {}", summary.skipped);
    println!("  Failed:    {}", summary.failed);

    Ok(())
}
