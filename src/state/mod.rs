//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `FrontierState`: the known set and the per-process attempted set
//! - `ItemOutcome`: what happened to one dispatched identifier
//! - `FailureStage`: where a failed identifier broke down

mod frontier_state;
mod outcome;

// Re-export main types
pub use frontier_state::FrontierState;
pub use outcome::{FailureStage, ItemOutcome};
