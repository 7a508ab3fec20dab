use serde::Deserialize;

/// Static-asset extensions that are never fetched as pages
pub const DEFAULT_SKIP_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "svg", "ico", "css", "js", "xml", "json", "txt", "zip", "rar",
    "exe", "dmg",
];

/// Main configuration structure for pdf-trawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Default maximum link depth from the seed URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of concurrent fetch workers
    pub concurrency: usize,

    /// Per-request timeout for page fetches and HEAD probes (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Only follow pages on the seed's host or its subdomains
    #[serde(rename = "same-site-only")]
    pub same_site_only: bool,

    /// Send a HEAD request to tentative PDF candidates before recording them
    #[serde(rename = "probe-unverified")]
    pub probe_unverified: bool,

    /// Path extensions never fetched as pages
    #[serde(rename = "skip-extensions")]
    pub skip_extensions: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            concurrency: 5,
            request_timeout_secs: 10,
            same_site_only: true,
            probe_unverified: true,
            skip_extensions: DEFAULT_SKIP_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "PdfTrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/pdf-trawl/pdf-trawl".to_string(),
            contact_email: "crawler@pdf-trawl.invalid".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Download configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Default target directory
    pub directory: String,

    /// Download every PDF as soon as it is discovered
    #[serde(rename = "auto-download")]
    pub auto_download: bool,

    /// Maximum number of downloads in flight, separate from crawl concurrency
    pub concurrency: usize,

    /// Per-download timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: "downloads".to_string(),
            auto_download: false,
            concurrency: 3,
            timeout_secs: 30,
        }
    }
}
