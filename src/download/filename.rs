//! Local file naming for downloaded PDFs

use url::Url;

/// Used when neither the path nor the host yields a usable name
const FALLBACK_STEM: &str = "document";

/// Derives a filesystem-safe file name from a PDF URL
///
/// The last path segment is percent-decoded and sanitized. A `.pdf`
/// extension is appended when missing. A URL with no usable segment is
/// named after its host.
///
/// # Examples
///
/// ```
/// use pdf_trawl::download::derive_filename;
/// use url::Url;
///
/// let url = Url::parse("https://site.com/docs/Annual%20Report.pdf").unwrap();
/// assert_eq!(derive_filename(&url), "Annual Report.pdf");
///
/// let url = Url::parse("https://site.com/download/1234").unwrap();
/// assert_eq!(derive_filename(&url), "1234.pdf");
/// ```
pub fn derive_filename(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    let decoded = urlencoding::decode(segment)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    let mut name = sanitize_filename::sanitize(decoded.trim());
    if name.trim_matches('.').is_empty() {
        name = url
            .host_str()
            .map(sanitize_filename::sanitize)
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| FALLBACK_STEM.to_string());
    }

    if !name.to_ascii_lowercase().ends_with(".pdf") {
        name.push_str(".pdf");
    }

    name
}

/// Returns `name` with `-n` inserted before its extension
pub(crate) fn with_suffix(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{}{}", &name[..dot], n, &name[dot..]),
        _ => format!("{}-{}", name, n),
    }
}
