//! pdf-trawl: a depth-bounded PDF discovery crawler
//!
//! This crate crawls a seed website up to a bounded link depth, recognizes PDF
//! documents along the way and optionally downloads them. A single
//! [`CrawlController`] owns the crawl session; callers poll it for status and
//! result snapshots.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod download;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for pdf-trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("A crawl session is already running")]
    AlreadyRunning,

    #[error("Fetch failed for {url}: {message}")]
    FetchFailure { url: String, message: String },

    #[error("Download failed for {url}: {message}")]
    DownloadFailure { url: String, message: String },

    #[error("Session failed: {0}")]
    SessionFatal(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Not crawlable (scheme {0})")]
    NotCrawlable(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for pdf-trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classify::{classify_url, Confidence};
pub use config::Config;
pub use crawler::{CrawlController, StartRequest};
pub use download::DownloadReport;
pub use state::{CrawlStatus, PdfRecord, PdfStatus, SessionPhase};
pub use crate::url::{normalize_input, resolve_link};
