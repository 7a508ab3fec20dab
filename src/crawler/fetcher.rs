//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - HEAD probes that confirm tentative PDF candidates
//! - Error classification

use crate::classify::is_pdf_content_type;
use crate::config::UserAgentConfig;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, Response};
use std::time::Duration;
use url::Url;

/// Redirect hops followed before a request is abandoned
const MAX_REDIRECTS: usize = 10;

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Html {
        /// Final URL after redirects; links resolve against it
        final_url: Url,
        /// Page body content
        body: String,
    },

    /// The server answered with a PDF; the body is not read
    Pdf {
        final_url: Url,
        content_type: String,
    },

    /// Neither HTML nor PDF
    NotHtml {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Result of a HEAD probe against a tentative PDF candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Content type confirms a PDF
    Pdf(String),
    /// Server answered with some other content type
    NotPdf(String),
    /// Probe failed or was inconclusive; the candidate stays unverified
    Unknown(String),
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total per-request timeout
///
/// # Example
///
/// ```no_run
/// use pdf_trawl::config::UserAgentConfig;
/// use pdf_trawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page fetcher and HEAD prober sharing one HTTP client
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a page and classifies the response
    ///
    /// | Response | Result |
    /// |----------|--------|
    /// | non-2xx | `HttpError` |
    /// | `application/pdf` | `Pdf` (body skipped) |
    /// | `text/html`, `application/xhtml+xml`, or no Content-Type | `Html` |
    /// | anything else | `NotHtml` |
    /// | transport failure | `NetworkError` |
    pub async fn fetch_page(&self, url: &Url) -> FetchResult {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                return FetchResult::NetworkError {
                    error: describe_error(&e),
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::HttpError {
                status_code: status.as_u16(),
            };
        }

        let final_url = response.url().clone();
        let content_type = content_type_of(&response);

        if is_pdf_content_type(&content_type) {
            return FetchResult::Pdf {
                final_url,
                content_type,
            };
        }

        if !is_html_content_type(&content_type) {
            return FetchResult::NotHtml { content_type };
        }

        match response.text().await {
            Ok(body) => FetchResult::Html { final_url, body },
            Err(e) => FetchResult::NetworkError {
                error: describe_error(&e),
            },
        }
    }

    /// Sends a HEAD request to learn a candidate's content type
    pub async fn probe(&self, url: &Url) -> ProbeOutcome {
        match self.client.head(url.clone()).send().await {
            Ok(response) if response.status().is_success() => {
                let content_type = content_type_of(&response);
                if is_pdf_content_type(&content_type) {
                    ProbeOutcome::Pdf(content_type)
                } else if content_type.is_empty() {
                    ProbeOutcome::Unknown("no Content-Type".to_string())
                } else {
                    ProbeOutcome::NotPdf(content_type)
                }
            }
            Ok(response) => ProbeOutcome::Unknown(format!("HTTP {}", response.status().as_u16())),
            Err(e) => ProbeOutcome::Unknown(describe_error(&e)),
        }
    }
}

/// Returns the Content-Type header value, or an empty string
pub(crate) fn content_type_of(response: &Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .trim()
        .to_string()
}

fn is_html_content_type(content_type: &str) -> bool {
    if content_type.is_empty() {
        return true;
    }
    let media_type = content_type.split(';').next().unwrap_or("").trim();
    media_type.eq_ignore_ascii_case("text/html")
        || media_type.eq_ignore_ascii_case("application/xhtml+xml")
}

/// Classifies a transport error into a short description
pub(crate) fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    }
}
