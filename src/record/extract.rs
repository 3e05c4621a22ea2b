//! Field-by-field extraction of a sequence page into a [`Record`]
//!
//! Sections of an OEIS entry page are `div`s tagged with `Seq*` classes. The
//! data terms live in the first `<tt>`. Only the data is mandatory; every
//! other section yields an empty value when absent.

use crate::identifier::Identifier;
use crate::record::{CodeFragments, CrossRef, LinkItem, Record};
use crate::MaterializeError;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use std::str::FromStr;
use url::Url;

/// Builds a record from a parsed sequence page
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `id` - Identifier the page was fetched for
/// * `link` - Address the page was fetched from
/// * `base` - Site root used to resolve cross-reference links
/// * `retrieved_at` - Timestamp stored on the record
///
/// # Returns
///
/// * `Ok(Record)` - The extracted record
/// * `Err(MaterializeError::MissingSequence)` - The page has no data terms
/// * `Err(MaterializeError::MalformedTerm)` - A data term is not an integer
pub fn extract_record(
    document: &Html,
    id: &Identifier,
    link: &Url,
    base: &Url,
    retrieved_at: DateTime<Utc>,
) -> Result<Record, MaterializeError> {
    Ok(Record {
        id: id.clone(),
        link: link.to_string(),
        sequence: extract_sequence(document)?,
        description: extract_description(document),
        keywords: extract_keywords(document),
        references: section_texts(document, "div.SeqD"),
        links: extract_links_section(document),
        crossrefs: extract_crossrefs(document, base),
        comments: section_texts(document, "div.SeqC"),
        code: CodeFragments {
            formulas: section_texts(document, "div.Seq.SeqF"),
            mathematica: section_texts(document, "div.Seq.Seqt"),
            maple: section_texts(document, "div.Seq.Seqp"),
            programs: section_texts(document, "div.Seq.Seqo"),
        },
        retrieved_at,
    })
}

/// Keeps only the lines of `text` that contain more than `k` words
///
/// # Examples
///
/// ```
/// use oeis_ripple::record::lines_with_more_than_k_words;
///
/// let text = "A000045\nFibonacci numbers: F(n) = F(n-1) + F(n-2)\n  \nnonn";
/// assert_eq!(
///     lines_with_more_than_k_words(2, text),
///     "Fibonacci numbers: F(n) = F(n-1) + F(n-2)"
/// );
/// ```
pub fn lines_with_more_than_k_words(k: usize, text: &str) -> String {
    text.lines()
        .filter(|line| line.split_whitespace().count() > k)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Parses a CSS selector; all selectors in this module are literals
fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Collected text of an element
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}

/// Trimmed text of every element matching `css`
fn section_texts(document: &Html, css: &str) -> Vec<String> {
    let Some(sel) = selector(css) else {
        return Vec::new();
    };

    document
        .select(&sel)
        .map(|element| element_text(&element).trim().to_string())
        .collect()
}

/// Data terms from the first `<tt>` element
fn extract_sequence(document: &Html) -> Result<Vec<serde_json::Number>, MaterializeError> {
    let tt = selector("tt")
        .and_then(|sel| document.select(&sel).next())
        .ok_or(MaterializeError::MissingSequence)?;

    element_text(&tt)
        .replace(',', " ")
        .split_whitespace()
        .map(parse_term)
        .collect()
}

/// Parses one signed integer term without losing precision
fn parse_term(term: &str) -> Result<serde_json::Number, MaterializeError> {
    let digits = term.strip_prefix('-').unwrap_or(term);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(MaterializeError::MalformedTerm(term.to_string()));
    }

    serde_json::Number::from_str(term).map_err(|_| MaterializeError::MalformedTerm(term.to_string()))
}

/// Name/description block, reduced to lines with more than two words
fn extract_description(document: &Html) -> String {
    selector(r#"td[align="left"][valign="top"]"#)
        .and_then(|sel| document.select(&sel).next())
        .map(|td| lines_with_more_than_k_words(2, element_text(&td).trim()))
        .unwrap_or_default()
}

/// Comma-separated keyword tags
fn extract_keywords(document: &Html) -> Vec<String> {
    selector("div.Seq.SeqK")
        .and_then(|sel| document.select(&sel).next())
        .map(|div| {
            element_text(&div)
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Each `<tt>` of the links section, with the href of its first anchor
fn extract_links_section(document: &Html) -> Vec<LinkItem> {
    let (Some(tt_sel), Some(a_sel)) = (selector("div.Seq.SeqH tt"), selector("a")) else {
        return Vec::new();
    };

    document
        .select(&tt_sel)
        .map(|tt| LinkItem {
            text: element_text(&tt).trim().to_string(),
            url: tt
                .select(&a_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string),
        })
        .collect()
}

/// Cross-reference blocks with their anchors resolved against `base`
fn extract_crossrefs(document: &Html, base: &Url) -> Vec<CrossRef> {
    let (Some(div_sel), Some(a_sel)) = (selector("div.Seq.SeqY"), selector("a[href]")) else {
        return Vec::new();
    };

    document
        .select(&div_sel)
        .map(|div| CrossRef {
            text: div
                .text()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<String>(),
            links: div
                .select(&a_sel)
                .filter_map(|a| a.value().attr("href"))
                .filter_map(|href| base.join(href).ok())
                .map(|url| url.to_string())
                .collect(),
        })
        .collect()
}
