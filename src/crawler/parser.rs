//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow or record (anchors and canonical links)
//! - Embedded document targets (`embed`, `iframe`, `object`)
//! - Page title

use crate::url::resolve_link;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Where on the page a link was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// `<a href>` or `<link rel="canonical">`; may be crawled as a page
    Anchor,
    /// `<embed src>`, `<iframe src>` or `<object data>`; only ever a PDF candidate
    Embed,
}

/// A resolved, canonical link discovered on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub url: Url,
    pub kind: LinkKind,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All usable links found on the page, in document order
    pub links: Vec<DiscoveredLink>,
}

/// (selector, attribute, kind) triples scanned in order
const LINK_SOURCES: &[(&str, &str, LinkKind)] = &[
    ("a[href]", "href", LinkKind::Anchor),
    ("link[rel='canonical'][href]", "href", LinkKind::Anchor),
    ("embed[src]", "src", LinkKind::Embed),
    ("iframe[src]", "src", LinkKind::Embed),
    ("object[data]", "data", LinkKind::Embed),
];

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">`, including ones carrying the `download` attribute
/// - `<link rel="canonical" href="...">`
/// - `<embed src>`, `<iframe src>`, `<object data>`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:`, `data:` and other non-HTTP schemes
/// - Fragment-only references (`#section`)
/// - Anything that does not resolve to an absolute http(s) URL
///
/// Relative references resolve against `<base href>` when the page has one,
/// otherwise against `base_url`. Fragments are stripped during resolution.
///
/// # Example
///
/// ```
/// use pdf_trawl::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].url.as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let base = effective_base(&document, base_url);
    let links = extract_links(&document, &base);

    ParsedPage { title, links }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Honours `<base href>` if present and resolvable
fn effective_base(document: &Html, page_url: &Url) -> Url {
    let Ok(selector) = Selector::parse("base[href]") else {
        return page_url.clone();
    };

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone())
}

fn extract_links(document: &Html, base: &Url) -> Vec<DiscoveredLink> {
    let mut links = Vec::new();

    for (selector, attr, kind) in LINK_SOURCES {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };

        for element in document.select(&selector) {
            if let Some(url) = resolve_attr(element, attr, base) {
                links.push(DiscoveredLink { url, kind: *kind });
            }
        }
    }

    links
}

fn resolve_attr(element: ElementRef<'_>, attr: &str, base: &Url) -> Option<Url> {
    let href = element.value().attr(attr)?.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    resolve_link(base, href).ok()
}
