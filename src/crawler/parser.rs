//! Identifier extraction from parsed pages
//!
//! Every `<a href>` on a page is resolved against the site root. Hrefs that
//! point at a sequence page on the same host become identifiers. Everything
//! else (b-files, wiki pages, searches, other hosts) is ignored.

use crate::identifier::{identifier_from_href, Identifier};
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Returns the set of identifiers referenced by a parsed page
///
/// This is total: a page without links, or with none that name a sequence,
/// yields an empty set.
///
/// # Example
///
/// ```
/// use oeis_ripple::crawler::extract_identifiers;
/// use scraper::Html;
/// use url::Url;
///
/// let html = Html::parse_document(r#"<a href="/A000045">Fibonacci</a><a href="/wiki/Main_Page">Wiki</a>"#);
/// let base = Url::parse("https://oeis.org").unwrap();
/// let ids = extract_identifiers(&html, &base);
/// assert_eq!(ids.len(), 1);
/// ```
pub fn extract_identifiers(document: &Html, base: &Url) -> BTreeSet<Identifier> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return BTreeSet::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| identifier_from_href(href, base))
        .collect()
}

/// Convenience wrapper that parses `html` first
pub fn extract_identifiers_from_html(html: &str, base: &Url) -> BTreeSet<Identifier> {
    extract_identifiers(&Html::parse_document(html), base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://oeis.org").unwrap()
    }

    fn tokens(ids: &BTreeSet<Identifier>) -> Vec<&str> {
        ids.iter().map(Identifier::as_str).collect()
    }

    #[test]
    fn test_relative_and_absolute_links() {
        let html = r#"<html><body>
            <a href="/A000032">Lucas</a>
            <a href="http://oeis.org/A000204">Lucas again</a>
            <a href="https://oeis.org/A000045">Fibonacci</a>
        </body></html>"#;

        let ids = extract_identifiers_from_html(html, &base());
        assert_eq!(tokens(&ids), vec!["A000032", "A000045", "A000204"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let html = r#"<a href="/A000032">x</a><a href="/A000032">y</a><a href="http://oeis.org/A000032">z</a>"#;
        assert_eq!(extract_identifiers_from_html(html, &base()).len(), 1);
    }

    #[test]
    fn test_non_sequence_links_ignored() {
        let html = r##"<html><body>
            <a href="/A000045/b000045.txt">b-file</a>
            <a href="/A000045/internal">internal</a>
            <a href="/search?q=id:A000045">search</a>
            <a href="/wiki/Index_to_OEIS">index</a>
            <a href="https://en.wikipedia.org/A000045">elsewhere</a>
            <a href="mailto:editors@oeis.org">mail</a>
            <a href="#top">top</a>
            <a>no href</a>
        </body></html>"##;

        assert!(extract_identifiers_from_html(html, &base()).is_empty());
    }

    #[test]
    fn test_malformed_document_yields_empty_set() {
        assert!(extract_identifiers_from_html("<<<not html", &base()).is_empty());
        assert!(extract_identifiers_from_html("", &base()).is_empty());
    }

    #[test]
    fn test_identifiers_inside_sections() {
        let html = r#"<div class="Seq SeqY">Cf. <a href="/A000108">A000108</a>.</div>
            <div class="Seq SeqH"><tt><a href="/A000108/b000108.txt">Table</a></tt></div>"#;

        let ids = extract_identifiers_from_html(html, &base());
        assert_eq!(tokens(&ids), vec!["A000108"]);
    }
}
