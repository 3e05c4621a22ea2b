//! Storage traits
//!
//! This module defines the trait interface for record storage backends.

use crate::identifier::Identifier;
use crate::record::Record;
use crate::MaterializeError;

/// Outcome of a conditional record write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The record was written by this call
    Written,

    /// A record for the identifier already existed; nothing was written
    AlreadyPresent,
}

/// Trait for record storage backends
///
/// Records are immutable: once a record exists for an identifier it is never
/// replaced. Implementations must be safe to call from many worker tasks.
pub trait RecordStore: Send + Sync {
    /// Returns true if a record exists for `id`
    fn contains(&self, id: &Identifier) -> bool;

    /// Writes `record` unless one already exists for its identifier
    ///
    /// Concurrent calls for the same identifier result in at most one write.
    fn put_if_absent(&self, record: &Record) -> Result<PutOutcome, MaterializeError>;

    /// Identifiers of every stored record, in order
    fn list(&self) -> std::io::Result<Vec<Identifier>>;
}
