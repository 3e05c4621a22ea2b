//! Initial frontier construction from an index page

use crate::config::SourceConfig;
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::parser::extract_identifiers_from_html;
use crate::storage::FrontierStore;
use crate::HarvestError;

/// Builds the frontier file from the configured index page
///
/// The existing-file check runs before any request is made, so a refused
/// seed never touches the network.
///
/// # Returns
///
/// * `Ok(usize)` - Number of identifiers written to the frontier
/// * `Err(HarvestError)` - The frontier already exists, the index could not
///   be fetched, or the file could not be written
pub async fn build_seed(
    fetcher: &HttpFetcher,
    frontier: &FrontierStore,
    source: &SourceConfig,
    overwrite: bool,
) -> Result<usize, HarvestError> {
    frontier.ensure_writable(overwrite)?;

    tracing::info!("Fetching seed index {}", source.seed_index_path);
    let body = fetcher.fetch_page(&source.seed_index_path).await?;

    let ids = extract_identifiers_from_html(&body, fetcher.base());
    if ids.is_empty() {
        tracing::warn!(
            "Seed index {} referenced no identifiers",
            source.seed_index_path
        );
    }

    frontier.initialize(&ids, overwrite)?;
    tracing::info!(
        "Wrote {} identifiers to {}",
        ids.len(),
        frontier.path().display()
    );
    Ok(ids.len())
}
