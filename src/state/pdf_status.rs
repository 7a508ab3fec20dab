//! PDF status definitions for tracking a discovered document
//!
//! This module defines every state a PdfRecord can be in, from discovery
//! through download.

use serde::Serialize;
use std::fmt;

/// Represents the current status of a discovered PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfStatus {
    // ===== Discovery States =====
    /// Confirmed PDF (by URL suffix or content type), not downloaded
    Found,

    /// URL hints at a PDF but no content type has confirmed it yet
    Unverified,

    // ===== Download Outcomes =====
    /// Bytes were written to the local path
    Downloaded,

    /// The target file was already present; nothing was fetched
    AlreadyExists,

    /// Download was attempted and failed; the record carries the reason
    DownloadFailed,
}

impl PdfStatus {
    /// Returns true if no download has been attempted yet
    pub fn is_discovery(&self) -> bool {
        matches!(self, Self::Found | Self::Unverified)
    }

    /// Converts the status to its wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::Unverified => "unverified",
            Self::Downloaded => "downloaded",
            Self::AlreadyExists => "already_exists",
            Self::DownloadFailed => "download_failed",
        }
    }

    /// Returns all possible statuses
    pub fn all_states() -> [Self; 5] {
        [
            Self::Found,
            Self::Unverified,
            Self::Downloaded,
            Self::AlreadyExists,
            Self::DownloadFailed,
        ]
    }
}

impl fmt::Display for PdfStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
