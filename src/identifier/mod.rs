//! Sequence identifiers
//!
//! An identifier names one OEIS sequence: the letter `A` followed by exactly
//! six digits (`A000045`). This module owns the token shape and the mapping
//! between identifiers and their addresses on the source site.

mod address;

pub use address::{address_of, identifier_from_href};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Identifier prefix letter
const PREFIX: char = 'A';

/// Number of digits following the prefix
const DIGITS: usize = 6;

/// Returned when a string is neither an identifier token nor an address of one
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a sequence identifier: '{0}'")]
pub struct InvalidIdentifier(pub String);

/// A validated sequence identifier
///
/// Ordering is lexicographic, which for a fixed-width numeric suffix is also
/// numeric order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Parses a bare token such as `A000045`
    pub fn from_token(token: &str) -> Result<Self, InvalidIdentifier> {
        if is_token(token) {
            Ok(Self(token.to_string()))
        } else {
            Err(InvalidIdentifier(token.to_string()))
        }
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the record file holding this identifier's record
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }

    /// Canonical address of this identifier under `base`
    pub fn address(&self, base: &Url) -> Url {
        address_of(self, base)
    }
}

/// Returns true if `s` has the identifier shape
fn is_token(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some(PREFIX)
        && s.len() == 1 + DIGITS
        && chars.all(|c| c.is_ascii_digit())
}

impl FromStr for Identifier {
    type Err = InvalidIdentifier;

    /// Accepts either a bare token or a full address (`https://oeis.org/A000045`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if is_token(s) {
            return Ok(Self(s.to_string()));
        }

        let url = Url::parse(s).map_err(|_| InvalidIdentifier(s.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(InvalidIdentifier(s.to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidIdentifier(s.to_string()));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default();
        match segments.as_slice() {
            [token] => Self::from_token(token).map_err(|_| InvalidIdentifier(s.to_string())),
            _ => Err(InvalidIdentifier(s.to_string())),
        }
    }
}

impl TryFrom<String> for Identifier {
    type Error = InvalidIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tokens() {
        assert!(Identifier::from_token("A000045").is_ok());
        assert!(Identifier::from_token("A999999").is_ok());
    }

    #[test]
    fn test_invalid_tokens() {
        for bad in ["", "A", "A12345", "A1234567", "B000045", "a000045", "A00004x", "A-00045"] {
            assert!(Identifier::from_token(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_parse_from_address() {
        let id: Identifier = "http://oeis.org/A000045".parse().unwrap();
        assert_eq!(id.as_str(), "A000045");

        let id: Identifier = "https://oeis.org/A000040".parse().unwrap();
        assert_eq!(id.as_str(), "A000040");
    }

    #[test]
    fn test_parse_rejects_non_sequence_addresses() {
        assert!("https://oeis.org/A000045/b000045.txt"
            .parse::<Identifier>()
            .is_err());
        assert!("https://oeis.org/A000045?lang=fr".parse::<Identifier>().is_err());
        assert!("https://oeis.org/wiki/Main_Page".parse::<Identifier>().is_err());
        assert!("mailto:A000045@oeis.org".parse::<Identifier>().is_err());
    }

    #[test]
    fn test_ordering_is_numeric() {
        let a: Identifier = "A000009".parse().unwrap();
        let b: Identifier = "A000010".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serde_accepts_tokens_and_urls() {
        let ids: Vec<Identifier> =
            serde_json::from_str(r#"["A000001", "http://oeis.org/A000002"]"#).unwrap();
        assert_eq!(ids[0].as_str(), "A000001");
        assert_eq!(ids[1].as_str(), "A000002");

        let out = serde_json::to_string(&ids).unwrap();
        assert_eq!(out, r#"["A000001","A000002"]"#);
    }

    #[test]
    fn test_serde_rejects_garbage() {
        let result: Result<Identifier, _> = serde_json::from_str(r#""hello""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_file_name() {
        let id = Identifier::from_token("A000045").unwrap();
        assert_eq!(id.file_name(), "A000045.json");
    }
}
