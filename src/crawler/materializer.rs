//! Record materialization
//!
//! Turns a fetched page into a stored record plus the identifiers it
//! references. Extraction of both happens from a single parse of the page.

use crate::crawler::parser::extract_identifiers;
use crate::identifier::Identifier;
use crate::record::extract_record;
use crate::storage::{PutOutcome, RecordStore};
use crate::MaterializeError;
use chrono::Utc;
use scraper::Html;
use std::collections::BTreeSet;
use std::sync::Arc;
use url::Url;

/// Result of a successful materialization call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializeOutcome {
    /// The record was written; `discovered` holds every referenced identifier
    Written { discovered: BTreeSet<Identifier> },

    /// A record already existed; the page was not parsed and nothing was written
    AlreadyPresent,
}

/// Idempotent record writer
pub struct Materializer {
    store: Arc<dyn RecordStore>,
    base: Url,
}

impl Materializer {
    /// Creates a materializer writing into `store`
    ///
    /// `base` is the site root used to recognize identifier links and to
    /// resolve cross-reference links.
    pub fn new(store: Arc<dyn RecordStore>, base: Url) -> Self {
        Self { store, base }
    }

    /// Returns true if a record for `id` is already stored
    pub fn is_materialized(&self, id: &Identifier) -> bool {
        self.store.contains(id)
    }

    /// Parses `body` and stores the record for `id`
    ///
    /// The store is checked before any parsing; an existing record makes this
    /// a no-op. This is synchronous (HTML parsing and file I/O) and is run on
    /// the blocking pool by the engine.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier the page belongs to
    /// * `link` - Address the page was fetched from
    /// * `body` - Raw page content
    pub fn materialize(
        &self,
        id: &Identifier,
        link: &Url,
        body: &str,
    ) -> Result<MaterializeOutcome, MaterializeError> {
        if self.store.contains(id) {
            return Ok(MaterializeOutcome::AlreadyPresent);
        }

        let (record, discovered) = {
            let document = Html::parse_document(body);
            let discovered = extract_identifiers(&document, &self.base);
            let record = extract_record(&document, id, link, &self.base, Utc::now())?;
            (record, discovered)
        };

        match self.store.put_if_absent(&record)? {
            PutOutcome::Written => Ok(MaterializeOutcome::Written { discovered }),
            PutOutcome::AlreadyPresent => Ok(MaterializeOutcome::AlreadyPresent),
        }
    }
}
