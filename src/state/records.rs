use crate::download::{derive_filename, DownloadOutcome};
use crate::state::PdfStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

/// One discovered PDF resource and its processing status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdfRecord {
    /// Canonical URL of the PDF
    pub url: String,

    /// Page the PDF was discovered on
    pub source_url: String,

    /// Local file name (final name after collision handling once downloaded)
    pub filename: String,

    /// Byte count, set after a successful download
    pub size: Option<u64>,

    pub status: PdfStatus,

    /// Where the file lives, set once a local copy exists
    pub local_path: Option<PathBuf>,

    /// Content-Type observed on a probe or download
    pub content_type: Option<String>,

    /// Failure reason for `download_failed`
    pub error: Option<String>,

    pub discovered_at: DateTime<Utc>,
}

impl PdfRecord {
    /// Creates a freshly discovered record
    pub fn new(url: &Url, source_url: &Url, status: PdfStatus) -> Self {
        Self {
            url: url.to_string(),
            source_url: source_url.to_string(),
            filename: derive_filename(url),
            size: None,
            status,
            local_path: None,
            content_type: None,
            error: None,
            discovered_at: Utc::now(),
        }
    }

    /// Attaches the content type that confirmed or described the resource
    pub fn with_content_type(mut self, content_type: Option<String>) -> Self {
        self.content_type = content_type;
        self
    }

    /// Folds a download outcome into the record in place
    pub fn apply_download(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded {
                path,
                size,
                content_type,
            } => {
                self.status = PdfStatus::Downloaded;
                self.size = Some(*size);
                self.set_local_path(path);
                if content_type.is_some() {
                    self.content_type = content_type.clone();
                }
                self.error = None;
            }
            DownloadOutcome::AlreadyExists { path } => {
                self.status = PdfStatus::AlreadyExists;
                self.set_local_path(path);
                self.error = None;
            }
            DownloadOutcome::Failed { reason, .. } => {
                self.status = PdfStatus::DownloadFailed;
                self.error = Some(reason.clone());
            }
            DownloadOutcome::Cancelled => {}
        }
    }

    fn set_local_path(&mut self, path: &std::path::Path) {
        if let Some(name) = path.file_name() {
            self.filename = name.to_string_lossy().into_owned();
        }
        self.local_path = Some(path.to_path_buf());
    }
}

/// Result of submitting a record to the ledger
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// First time this URL was seen
    New(PdfRecord),
    /// An unverified record was confirmed as found
    Upgraded(PdfRecord),
    /// Already known; nothing changed
    Duplicate,
}

/// Insertion-ordered set of PdfRecords keyed by URL
///
/// The session owns the only ledger and guards it with a lock; callers only
/// ever receive clones.
#[derive(Debug, Default)]
pub struct PdfLedger {
    records: Vec<PdfRecord>,
    index: HashMap<String, usize>,
}

impl PdfLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new record, or upgrades an unverified one that is now found
    ///
    /// The first submission fixes `source_url` and `discovered_at`.
    pub fn submit(&mut self, record: PdfRecord) -> Submission {
        if let Some(&idx) = self.index.get(&record.url) {
            let existing = &mut self.records[idx];
            if existing.status == PdfStatus::Unverified && record.status == PdfStatus::Found {
                existing.status = PdfStatus::Found;
                if record.content_type.is_some() {
                    existing.content_type = record.content_type;
                }
                return Submission::Upgraded(existing.clone());
            }
            return Submission::Duplicate;
        }

        self.index.insert(record.url.clone(), self.records.len());
        self.records.push(record.clone());
        Submission::New(record)
    }

    /// Applies `f` to the record for `url`; returns the updated copy
    pub fn update<F>(&mut self, url: &str, f: F) -> Option<PdfRecord>
    where
        F: FnOnce(&mut PdfRecord),
    {
        let idx = *self.index.get(url)?;
        let record = &mut self.records[idx];
        f(record);
        Some(record.clone())
    }

    pub fn get(&self, url: &str) -> Option<&PdfRecord> {
        self.index.get(url).map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Owned copy of every record in insertion order
    pub fn snapshot(&self) -> Vec<PdfRecord> {
        self.records.clone()
    }
}

/// Cloneable handle to a session's ledger
///
/// Every method takes the lock for one short synchronous section, so the
/// lock is never held across an await.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<PdfLedger>>,
}

impl SharedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&self, record: PdfRecord) -> Submission {
        self.lock().submit(record)
    }

    pub fn update<F>(&self, url: &str, f: F) -> Option<PdfRecord>
    where
        F: FnOnce(&mut PdfRecord),
    {
        self.lock().update(url, f)
    }

    pub fn get(&self, url: &str) -> Option<PdfRecord> {
        self.lock().get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<PdfRecord> {
        self.lock().snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, PdfLedger> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
