//! Configuration module for OEIS-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so the harvester also runs without any file.
//!
//! # Example
//!
//! ```no_run
//! use oeis_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("oeis-ripple.toml")).unwrap();
//! println!("Fetch capacity: {}", config.crawler.max_concurrent_fetches);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, SourceConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
