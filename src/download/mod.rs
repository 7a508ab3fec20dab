//! PDF download path
//!
//! Shared by auto-download during a crawl and by on-demand single downloads:
//!
//! 1. Assign a stable local path, suffixing names that collide
//! 2. Skip the fetch when the path already exists
//! 3. GET with the download timeout, racing cancellation
//! 4. For unverified records, require a PDF content type
//! 5. Write through a [`ByteSink`] on the blocking pool

mod dispatch;
mod downloader;
mod filename;
mod sink;

pub use dispatch::DownloadDispatcher;
pub use downloader::{DownloadOutcome, Downloader};
pub use filename::derive_filename;
pub use sink::{ByteSink, FsSink};

use crate::state::PdfStatus;
use serde::Serialize;
use std::path::PathBuf;

/// Result of an on-demand download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub ok: bool,
    pub url: String,
    pub filename: String,
    pub path: PathBuf,
    pub status: PdfStatus,
    /// Bytes written; None when the file already existed
    pub size: Option<u64>,
}
