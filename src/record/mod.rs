//! Sequence records
//!
//! A [`Record`] is the durable artifact written once per identifier. Field
//! names match the JSON layout of the record files.

mod extract;

pub use extract::{extract_record, lines_with_more_than_k_words};

use crate::identifier::Identifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One materialized sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Identifier,

    /// Address the document was fetched from
    pub link: String,

    /// Sequence terms; arbitrary precision, as terms routinely exceed 64 bits
    pub sequence: Vec<serde_json::Number>,

    pub description: String,
    pub keywords: Vec<String>,
    pub references: Vec<String>,
    pub links: Vec<LinkItem>,
    pub crossrefs: Vec<CrossRef>,
    pub comments: Vec<String>,

    #[serde(flatten)]
    pub code: CodeFragments,

    pub retrieved_at: DateTime<Utc>,
}

/// An entry of the links section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    pub text: String,
    pub url: Option<String>,
}

/// An entry of the cross-references section, with its links resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossRef {
    pub text: String,
    pub links: Vec<String>,
}

/// Formulas and programs, grouped by source dialect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFragments {
    pub formulas: Vec<String>,
    pub mathematica: Vec<String>,
    pub maple: Vec<String>,
    pub programs: Vec<String>,
}
