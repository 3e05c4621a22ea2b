//! Per-identifier pipeline outcomes
//!
//! Every dispatched identifier settles into exactly one of these. Workers
//! return them to the engine instead of touching shared state.
use crate::identifier::Identifier;
use std::collections::BTreeSet;
use std::fmt;

/// The pipeline stage at which an identifier failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// Network, timeout, or non-success status
    Fetch,

    /// Parsing the document or writing its record
    Materialize,

    /// The worker task itself panicked or was cancelled
    Task,
}

impl FailureStage {
    /// Short lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Materialize => "materialize",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one identifier through fetch, extract and materialize
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Fetched and written; carries every identifier the document references
    Materialized { discovered: BTreeSet<Identifier> },

    /// A record already existed, so nothing was fetched or written
    AlreadyMaterialized,

    /// Failed at `stage`; contributes no discoveries
    Failed { stage: FailureStage, error: String },
}
