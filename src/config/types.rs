use serde::Deserialize;

/// Main configuration structure for OEIS-Ripple
///
/// Every section is optional; a missing section falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Log the running success counter every N successes
    #[serde(rename = "progress-interval")]
    pub progress_interval: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 100,
            request_timeout_secs: 30,
            progress_interval: 50,
        }
    }
}

/// Where documents come from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Site root; identifiers resolve to `<base-url>/<identifier>`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the index page used to build the seed frontier
    #[serde(rename = "seed-index-path")]
    pub seed_index_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://oeis.org".to_string(),
            seed_index_path: "/wiki/Index_to_OEIS:_Section_Cor".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// Optional email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "oeis-ripple".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_email: String::new(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// `Name/Version` or `Name/Version (+mailto:Email)` when a contact is set.
    pub fn header_value(&self) -> String {
        if self.contact_email.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} (+mailto:{})",
                self.crawler_name, self.crawler_version, self.contact_email
            )
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding one `<identifier>.json` record per sequence
    #[serde(rename = "data-dir")]
    pub data_dir: String,

    /// JSON array of known identifiers, rewritten after every round
    #[serde(rename = "frontier-path")]
    pub frontier_path: String,

    /// Destination of the compacted archive
    #[serde(rename = "compiled-path")]
    pub compiled_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            frontier_path: "list.json".to_string(),
            compiled_path: "compiled.json".to_string(),
        }
    }
}
