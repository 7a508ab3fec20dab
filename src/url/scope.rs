use url::Url;

/// Decides which discovered pages are worth fetching
///
/// Only page links go through the scope; PDF candidates are recorded wherever
/// they are hosted.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    /// Seed host with any `www.` prefix removed
    seed_host: String,

    /// Restrict pages to the seed host and its subdomains
    same_site_only: bool,

    /// Lowercased path extensions that are never fetched as pages
    skip_extensions: Vec<String>,
}

impl CrawlScope {
    /// Creates a scope anchored at the seed URL
    pub fn new(seed: &Url, same_site_only: bool, skip_extensions: &[String]) -> Self {
        let seed_host = extract_domain(seed)
            .map(|host| strip_www(&host).to_string())
            .unwrap_or_default();

        Self {
            seed_host,
            same_site_only,
            skip_extensions: skip_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Returns true if the page at `url` should be fetched
    pub fn allows(&self, url: &Url) -> bool {
        self.is_on_site(url) && !self.is_skipped_asset(url)
    }

    /// Returns true if `url` is on the seed's site (or same-site is disabled)
    pub fn is_on_site(&self, url: &Url) -> bool {
        if !self.same_site_only {
            return true;
        }

        match extract_domain(url) {
            Some(host) => is_same_or_subdomain(&self.seed_host, strip_www(&host)),
            None => false,
        }
    }

    /// Returns true if the URL path ends in a skipped static-asset extension
    pub fn is_skipped_asset(&self, url: &Url) -> bool {
        match path_extension(url) {
            Some(ext) => self.skip_extensions.iter().any(|skip| *skip == ext),
            None => false,
        }
    }
}

/// Extracts the lowercase host of a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use pdf_trawl::url::extract_domain;
///
/// let url = Url::parse("https://Sub.Example.com:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("sub.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the lowercased extension of the final path segment, if any
pub fn path_extension(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// `candidate` is `base` itself or any subdomain of it
fn is_same_or_subdomain(base: &str, candidate: &str) -> bool {
    if base.is_empty() {
        return false;
    }
    candidate == base
        || candidate
            .strip_suffix(base)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
