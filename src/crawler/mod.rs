//! Crawler module for harvesting sequence records
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching of sequence pages and the seed index
//! - Identifier extraction from fetched pages
//! - Idempotent record materialization
//! - The bounded concurrency gate
//! - The round-based frontier engine

mod engine;
mod fetcher;
mod gate;
mod materializer;
mod parser;
mod seed;

pub use engine::FrontierEngine;
pub use fetcher::{build_http_client, DocumentFetcher, HttpFetcher};
pub use gate::{ConcurrencyGate, GatePermit};
pub use materializer::{MaterializeOutcome, Materializer};
pub use parser::{extract_identifiers, extract_identifiers_from_html};
pub use seed::build_seed;

use crate::config::Config;
use crate::output::CrawlReport;
use crate::storage::{FrontierStore, FsRecordStore};
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// Runs the harvest to a fixed point
///
/// This is the main entry point for a crawl. It will:
/// 1. Ensure the data directory exists
/// 2. Load the frontier file (a missing file is fatal)
/// 3. Build the HTTP client
/// 4. Run rounds until no identifier is left unattempted
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run converged; per-item failures are in the report
/// * `Err(HarvestError)` - Startup failed or a frontier snapshot could not be written
pub async fn crawl(config: &Config) -> Result<CrawlReport> {
    let store = FsRecordStore::open(Path::new(&config.output.data_dir))?;
    tracing::info!("Records directory: {}", store.dir().display());

    let frontier = FrontierStore::new(&config.output.frontier_path);
    let known = frontier.load()?;
    tracing::info!(
        "Loaded {} identifiers from {}",
        known.len(),
        frontier.path().display()
    );

    let fetcher = HttpFetcher::from_config(config)?;
    let materializer = Materializer::new(Arc::new(store), fetcher.base().clone());
    let gate = ConcurrencyGate::new(config.crawler.max_concurrent_fetches as usize);

    let engine = FrontierEngine::new(Arc::new(fetcher), Arc::new(materializer), gate, frontier)
        .with_progress_interval(config.crawler.progress_interval);

    engine.run(known).await
}

/// Builds the frontier file from the configured seed index
pub async fn seed(config: &Config, overwrite: bool) -> Result<usize> {
    let fetcher = HttpFetcher::from_config(config)?;
    let frontier = FrontierStore::new(&config.output.frontier_path);
    build_seed(&fetcher, &frontier, &config.source, overwrite).await
}
