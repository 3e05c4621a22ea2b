//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for sequence pages and the seed index
//! - Error classification into `FetchError`

use crate::config::{Config, UserAgentConfig};
use crate::identifier::Identifier;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Retrieves the raw content of a document
///
/// Implementations must be safe to call concurrently; the engine bounds how
/// many calls are in flight through its gate.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches the document named by `id`
    async fn fetch(&self, id: &Identifier) -> Result<String, FetchError>;

    /// Canonical address of `id`
    fn address(&self, id: &Identifier) -> Url;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages from the configured source site
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    /// Creates a fetcher for documents under `base`
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    /// Builds a fetcher from the `[source]`, `[crawler]` and `[user-agent]` sections
    pub fn from_config(config: &Config) -> Result<Self, crate::HarvestError> {
        let base = Url::parse(&config.source.base_url)
            .map_err(|e| crate::ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;
        Ok(Self::new(client, base))
    }

    /// Site root
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Fetches an arbitrary page on the source site, such as the seed index
    pub async fn fetch_page(&self, path: &str) -> Result<String, FetchError> {
        let url = self.base.join(path).map_err(|e| FetchError::Network {
            url: path.to_string(),
            message: format!("invalid address: {}", e),
        })?;
        self.get(url).await
    }

    /// Sends a GET and returns the body of a successful response
    ///
    /// # Error Classification
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Request or body read timed out | `Timeout` |
    /// | Status outside 2xx (after redirects) | `Status` |
    /// | Anything else (DNS, connect, TLS, decode) | `Network` |
    async fn get(&self, url: Url) -> Result<String, FetchError> {
        let url_str = url.to_string();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(&url_str, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_str,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| classify_error(&url_str, e))
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, id: &Identifier) -> Result<String, FetchError> {
        self.get(id.address(&self.base)).await
    }

    fn address(&self, id: &Identifier) -> Url {
        id.address(&self.base)
    }
}

/// Maps a transport error onto `FetchError`
fn classify_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
