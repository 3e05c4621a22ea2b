//! OEIS-Ripple main entry point
//!
//! This is the command-line interface for the OEIS-Ripple sequence harvester.

use anyhow::Context;
use clap::{Parser, Subcommand};
use oeis_ripple::config::{load_config_with_hash, Config};
use oeis_ripple::crawler;
use oeis_ripple::output::{
    compact, load_dataset_statistics, print_dataset_statistics, print_report,
};
use oeis_ripple::storage::{FrontierStore, FsRecordStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// OEIS-Ripple: an incremental sequence-record harvester
///
/// OEIS-Ripple starts from a frontier of sequence identifiers, fetches each
/// sequence page, stores it as a JSON record and follows the identifiers it
/// references until no new ones turn up.
#[derive(Parser, Debug)]
#[command(name = "oeis-ripple")]
#[command(version)]
#[command(about = "An incremental OEIS sequence-record harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest every identifier reachable from the frontier (default)
    Crawl,

    /// Build the frontier file from the seed index page
    Seed {
        /// Replace an existing frontier file
        #[arg(long)]
        overwrite: bool,
    },

    /// Write every stored record into a single JSON archive
    Compact,

    /// Show frontier and record statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let result = match cli.command.unwrap_or(Command::Crawl) {
        Command::Crawl => handle_crawl(&config).await,
        Command::Seed { overwrite } => handle_seed(&config, overwrite).await,
        Command::Compact => handle_compact(&config),
        Command::Stats => handle_stats(&config),
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("oeis_ripple=info,warn"),
            1 => EnvFilter::new("oeis_ripple=debug,info"),
            2 => EnvFilter::new("oeis_ripple=trace,debug"),
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

/// Handles the crawl command: runs rounds until the frontier converges
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting from {} with up to {} concurrent fetches",
        config.source.base_url,
        config.crawler.max_concurrent_fetches
    );

    let report = crawler::crawl(config).await.context("Crawl failed")?;
    print_report(&report);

    if report.total_failed() > 0 {
        tracing::warn!(
            "{} identifiers failed; they will be retried on the next run",
            report.total_failed()
        );
    }
    Ok(())
}

/// Handles the seed command: writes the initial frontier
async fn handle_seed(config: &Config, overwrite: bool) -> anyhow::Result<()> {
    let count = crawler::seed(config, overwrite)
        .await
        .context("Failed to build seed frontier")?;

    println!(
        "✓ Seeded {} identifiers into {}",
        count, config.output.frontier_path
    );
    Ok(())
}

/// Handles the compact command: writes the compiled archive
fn handle_compact(config: &Config) -> anyhow::Result<()> {
    println!("=== Compacting Records ===\n");
    println!("Records: {}", config.output.data_dir);
    println!("Output: {}", config.output.compiled_path);
    println!();

    let count = compact(
        Path::new(&config.output.data_dir),
        Path::new(&config.output.compiled_path),
    )
    .context("Compaction failed")?;

    println!("✓ Compacted {} records", count);
    Ok(())
}

/// Handles the stats command: compares the frontier with the records on disk
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Frontier: {}", config.output.frontier_path);
    println!("Records: {}\n", config.output.data_dir);

    let frontier = FrontierStore::new(&config.output.frontier_path);
    let store = FsRecordStore::open(Path::new(&config.output.data_dir))
        .context("Failed to open records directory")?;

    let stats =
        load_dataset_statistics(&frontier, &store).context("Failed to load statistics")?;
    print_dataset_statistics(&stats);

    Ok(())
}
