//! PDF candidate classification
//!
//! Classification runs cheaply from the URL alone while crawling and is
//! corrected once response headers are available:
//!
//! 1. Path ends in `.pdf` (any case) → confident
//! 2. A directory segment hints at a file (`/pdf/`, `/download/`, `/file/`) →
//!    tentative, recorded as `unverified` until a content type confirms it
//! 3. `embed`/`iframe`/`object` targets use rules 1–2; anything else they
//!    point at is ignored rather than crawled
//! 4. A fetched response with `Content-Type: application/pdf` is a PDF
//!    regardless of URL shape

use crate::crawler::LinkKind;
use crate::state::PdfStatus;
use url::Url;

/// Directory names that suggest a link serves a document
pub const PDF_HINT_SEGMENTS: &[&str] = &["pdf", "download", "file"];

/// Media types accepted as PDF
const PDF_MEDIA_TYPES: &[&str] = &["application/pdf", "application/x-pdf"];

/// Classification strength of a PDF candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    /// The URL alone proves it
    Confident,
    /// The URL suggests it; a content type must confirm it
    Tentative,
}

impl Confidence {
    /// The status a new record starts with
    pub fn initial_status(self) -> PdfStatus {
        match self {
            Self::Confident => PdfStatus::Found,
            Self::Tentative => PdfStatus::Unverified,
        }
    }
}

/// What to do with a link discovered on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkClass {
    /// Record as a PDF with the given confidence
    Pdf(Confidence),
    /// Candidate page to crawl
    Page,
    /// Neither a PDF nor something the crawler follows
    Ignore,
}

/// Classifies a URL by its shape (rules 1 and 2)
///
/// # Examples
///
/// ```
/// use pdf_trawl::classify::{classify_url, Confidence};
/// use url::Url;
///
/// let pdf = Url::parse("https://site.com/a.PDF").unwrap();
/// assert_eq!(classify_url(&pdf), Some(Confidence::Confident));
///
/// let hinted = Url::parse("https://site.com/download/report").unwrap();
/// assert_eq!(classify_url(&hinted), Some(Confidence::Tentative));
///
/// let listing = Url::parse("https://site.com/download/").unwrap();
/// assert_eq!(classify_url(&listing), Some(Confidence::Tentative));
///
/// let page = Url::parse("https://site.com/about").unwrap();
/// assert_eq!(classify_url(&page), None);
/// ```
pub fn classify_url(url: &Url) -> Option<Confidence> {
    let path = url.path().to_ascii_lowercase();

    if path.ends_with(".pdf") {
        return Some(Confidence::Confident);
    }

    if has_hint_segment(&path) {
        return Some(Confidence::Tentative);
    }

    None
}

/// Classifies a link by its shape and the tag it was found in (rules 1–3)
pub fn classify_link(url: &Url, kind: LinkKind) -> LinkClass {
    match (classify_url(url), kind) {
        (Some(confidence), _) => LinkClass::Pdf(confidence),
        (None, LinkKind::Anchor) => LinkClass::Page,
        (None, LinkKind::Embed) => LinkClass::Ignore,
    }
}

/// Returns true if a `Content-Type` header value denotes a PDF (rule 4)
///
/// Parameters and case are ignored.
pub fn is_pdf_content_type(value: &str) -> bool {
    let media_type = value.split(';').next().unwrap_or("").trim();
    PDF_MEDIA_TYPES
        .iter()
        .any(|pdf| media_type.eq_ignore_ascii_case(pdf))
}

/// A hint counts only as a directory, so `/download/` matches and
/// `/download` or `/downloads/` do not
fn has_hint_segment(path: &str) -> bool {
    PDF_HINT_SEGMENTS
        .iter()
        .any(|hint| path.contains(&format!("/{}/", hint)))
}
