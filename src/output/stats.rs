//! Result statistics for a crawl session

use crate::state::{CrawlStatus, PdfRecord, PdfStatus};
use std::collections::{HashMap, HashSet};

/// Aggregate counts over a session's PDF records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultStatistics {
    /// Total number of PDF records
    pub total_pdfs: usize,

    /// Count of records by status
    pub pdfs_by_status: HashMap<PdfStatus, usize>,

    /// Number of distinct pages PDFs were discovered on
    pub source_pages: usize,

    /// Bytes written by successful downloads
    pub bytes_downloaded: u64,

    /// Failed downloads and their reasons
    pub failures: Vec<(String, String)>,
}

impl ResultStatistics {
    /// Computes statistics from a result snapshot
    pub fn from_records(records: &[PdfRecord]) -> Self {
        let mut pdfs_by_status = HashMap::new();
        let mut sources = HashSet::new();
        let mut bytes_downloaded = 0;
        let mut failures = Vec::new();

        for record in records {
            *pdfs_by_status.entry(record.status).or_insert(0) += 1;
            sources.insert(record.source_url.as_str());

            if record.status == PdfStatus::Downloaded {
                bytes_downloaded += record.size.unwrap_or(0);
            }

            if record.status == PdfStatus::DownloadFailed {
                failures.push((
                    record.url.clone(),
                    record.error.clone().unwrap_or_else(|| "unknown".to_string()),
                ));
            }
        }

        Self {
            total_pdfs: records.len(),
            pdfs_by_status,
            source_pages: sources.len(),
            bytes_downloaded,
            failures,
        }
    }

    pub fn count(&self, status: PdfStatus) -> usize {
        self.pdfs_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ResultStatistics, status: &CrawlStatus) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  URLs processed: {}", status.urls_processed);
    println!("  URLs visited: {}", status.urls_visited);
    println!("  PDFs found: {}", stats.total_pdfs);
    println!("  Pages with PDFs: {}", stats.source_pages);
    println!();

    println!("PDFs by Status:");
    for status in PdfStatus::all_states() {
        let count = stats.count(status);
        if count == 0 {
            continue;
        }
        let percentage = (count as f64 / stats.total_pdfs as f64) * 100.0;
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    if stats.bytes_downloaded > 0 {
        println!("Downloaded: {} bytes", stats.bytes_downloaded);
        println!();
    }

    if !stats.failures.is_empty() {
        println!("Failed Downloads ({}):", stats.failures.len());
        for (url, reason) in &stats.failures {
            println!("  - {} ({})", url, reason);
        }
        println!();
    }
}
