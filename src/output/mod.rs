//! Output module for reports and archives
//!
//! This module handles:
//! - Per-round run reports and their console rendering
//! - Dataset statistics (known vs. materialized identifiers)
//! - Compacting every record file into one JSON archive

mod compact;
pub mod stats;

pub use compact::compact;
pub use stats::{
    load_dataset_statistics, print_dataset_statistics, print_report, CrawlReport,
    DatasetStatistics, FailedItem, RoundReport,
};
