//! Output module for crawl summaries and reports
//!
//! This module handles:
//! - Generating markdown summaries of crawl results
//! - Computing and printing result statistics

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, ResultStatistics};

use crate::state::{CrawlStatus, PdfRecord};
use chrono::{DateTime, Utc};

/// Everything a report needs about one session
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub seed_url: String,
    pub max_depth: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// SHA-256 of the config file, when one was loaded
    pub config_hash: Option<String>,
    pub status: CrawlStatus,
    pub records: Vec<PdfRecord>,
}
