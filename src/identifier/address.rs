use crate::identifier::Identifier;
use url::Url;

/// Builds the canonical address of `id` under `base`
///
/// The identifier is appended as the final path segment, so both
/// `https://oeis.org` and `https://oeis.org/` yield `https://oeis.org/A000045`.
///
/// # Examples
///
/// ```
/// use oeis_ripple::identifier::{address_of, Identifier};
/// use url::Url;
///
/// let base = Url::parse("https://oeis.org").unwrap();
/// let id = Identifier::from_token("A000045").unwrap();
/// assert_eq!(address_of(&id, &base).as_str(), "https://oeis.org/A000045");
/// ```
pub fn address_of(id: &Identifier, base: &Url) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);

    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().push(id.as_str());
        }
        Err(()) => return base.join(id.as_str()).unwrap_or_else(|_| base.clone()),
    }

    url
}

/// Resolves an `href` found on a page and returns the identifier it points to
///
/// Relative hrefs are resolved against `base`. The result must be on the
/// same host as `base` (either scheme), carry no query or fragment, and have
/// exactly one path segment below `base`'s path, which must be an identifier.
///
/// # Examples
///
/// ```
/// use oeis_ripple::identifier::identifier_from_href;
/// use url::Url;
///
/// let base = Url::parse("https://oeis.org").unwrap();
/// assert!(identifier_from_href("/A000045", &base).is_some());
/// assert!(identifier_from_href("http://oeis.org/A000045", &base).is_some());
/// assert!(identifier_from_href("/A000045/b000045.txt", &base).is_none());
/// assert!(identifier_from_href("https://example.com/A000045", &base).is_none());
/// ```
pub fn identifier_from_href(href: &str, base: &Url) -> Option<Identifier> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = base.join(href).ok()?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    if !same_host(&resolved, base) {
        return None;
    }
    if resolved.query().is_some() || resolved.fragment().is_some() {
        return None;
    }

    let base_segments: Vec<&str> = base
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let segments: Vec<&str> = resolved.path_segments()?.collect();

    if segments.len() != base_segments.len() + 1 || !segments.starts_with(&base_segments) {
        return None;
    }

    Identifier::from_token(segments[base_segments.len()]).ok()
}

/// Host comparison ignoring case, a leading `www.`, and the scheme's default port
fn same_host(url: &Url, base: &Url) -> bool {
    let normalize = |host: &str| {
        let host = host.to_lowercase();
        host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
    };

    match (url.host_str(), base.host_str()) {
        (Some(a), Some(b)) => normalize(a) == normalize(b) && url.port() == base.port(),
        _ => false,
    }
}
