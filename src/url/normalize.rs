use crate::UrlError;
use url::Url;

/// Schemes that are recognized but never crawled
const NON_CRAWLABLE_SCHEMES: &[&str] = &[
    "mailto",
    "javascript",
    "tel",
    "sms",
    "data",
    "blob",
    "ftp",
    "file",
];

/// Normalizes user input (the seed URL) into a canonical crawlable URL
///
/// # Normalization Steps
///
/// 1. Trim whitespace; reject empty input
/// 2. Prepend `https://` when no scheme is present
/// 3. Parse; the parser lowercases the host and drops default ports
/// 4. Reject non-http(s) schemes as not crawlable
/// 5. Drop the fragment and an empty query string
///
/// # Examples
///
/// ```
/// use pdf_trawl::url::normalize_input;
///
/// let url = normalize_input("  Example.COM/reports#top ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/reports");
/// ```
pub fn normalize_input(raw: &str) -> Result<Url, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if has_explicit_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Resolves a link found on a page against the page's own absolute URL
///
/// Standard URI resolution applies (`../`, `./`, protocol-relative links,
/// absolute links). The result is canonicalized the same way as
/// [`normalize_input`], so `page#a` and `page#b` resolve to the same URL.
///
/// # Examples
///
/// ```
/// use pdf_trawl::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/index.html").unwrap();
/// let url = resolve_link(&base, "../files/a.pdf#page=2").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/files/a.pdf");
/// ```
pub fn resolve_link(base: &Url, href: &str) -> Result<Url, UrlError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Empty);
    }

    if let Some(scheme) = scheme_prefix(href) {
        if is_non_crawlable(scheme) {
            return Err(UrlError::NotCrawlable(scheme.to_ascii_lowercase()));
        }
    }

    let url = base.join(href).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize(url)
}

/// Applies the canonical form used as the dedup key
pub(crate) fn canonicalize(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::NotCrawlable(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}

/// Returns true when the input already names a scheme we should honor
fn has_explicit_scheme(input: &str) -> bool {
    if input.contains("://") {
        return true;
    }
    scheme_prefix(input).is_some_and(is_non_crawlable)
}

/// Returns the text before the first `:` if it is shaped like a URI scheme
fn scheme_prefix(input: &str) -> Option<&str> {
    let (scheme, _) = input.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Some(scheme)
    } else {
        None
    }
}

fn is_non_crawlable(scheme: &str) -> bool {
    NON_CRAWLABLE_SCHEMES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(scheme))
}
