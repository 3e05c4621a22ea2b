//! OEIS-Ripple: an incremental sequence-record harvester
//!
//! This crate discovers and materializes OEIS sequence records reachable from
//! a seed set. It fetches pages, follows the sequence identifiers they
//! reference, and persists one JSON record per sequence. Rounds repeat until a
//! fixed point is reached.

pub mod config;
pub mod crawler;
pub mod identifier;
pub mod output;
pub mod record;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for OEIS-Ripple operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Frontier error: {0}")]
    Frontier(#[from] FrontierError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while retrieving a document
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },
}

/// Errors raised while turning a fetched document into a stored record
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("Storage error for {path}: {source}")]
    Storage {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Document has no sequence data")]
    MissingSequence,

    #[error("Malformed sequence term: {0}")]
    MalformedTerm(String),
}

/// Errors raised by frontier persistence
#[derive(Debug, Error)]
pub enum FrontierError {
    #[error("No frontier state found at {0}")]
    NotFound(String),

    #[error("Frontier state already exists at {0} (use --overwrite to replace it)")]
    AlreadyExists(String),

    #[error("Failed to access frontier state at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse frontier state at {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Failed to serialize frontier state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while compacting records into one archive
#[derive(Debug, Error)]
pub enum CompactError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed record file {path}: {source}")]
    Malformed {
        path: String,
        source: serde_json::Error,
    },
}

/// Result type alias for OEIS-Ripple operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use identifier::Identifier;
pub use record::Record;
pub use state::{FailureStage, FrontierState, ItemOutcome};
