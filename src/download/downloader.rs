use crate::classify::is_pdf_content_type;
use crate::crawler::fetcher::{content_type_of, describe_error};
use crate::download::filename::{derive_filename, with_suffix};
use crate::download::sink::ByteSink;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Upper bound on numeric suffixes tried for one file name
const MAX_SUFFIX: usize = 10_000;

/// Result of one download attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Bytes were fetched and written
    Downloaded {
        path: PathBuf,
        size: u64,
        content_type: Option<String>,
    },

    /// The assigned path was already present; nothing was fetched
    AlreadyExists { path: PathBuf },

    /// The attempt failed; the record keeps the reason
    Failed {
        reason: String,
        path: Option<PathBuf>,
    },

    /// The session was stopped before the attempt finished
    Cancelled,
}

/// Remembers which URL owns each assigned path
#[derive(Debug, Default)]
struct PathRegistry {
    by_url: HashMap<(PathBuf, String), PathBuf>,
    owners: HashMap<PathBuf, String>,
}

/// Fetches PDFs into a directory through a [`ByteSink`]
///
/// One downloader lives as long as its controller, so path assignments stay
/// stable across sessions and on-demand downloads.
pub struct Downloader {
    client: reqwest::Client,
    sink: Arc<dyn ByteSink>,
    timeout: Duration,
    registry: Mutex<PathRegistry>,
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Downloader {
    pub fn new(client: reqwest::Client, sink: Arc<dyn ByteSink>, timeout: Duration) -> Self {
        Self {
            client,
            sink,
            timeout,
            registry: Mutex::new(PathRegistry::default()),
        }
    }

    /// Returns the local path for `url` inside `dir`
    ///
    /// The same URL always maps back to the same path. A different URL whose
    /// name collides with an assigned path gets `name-1.pdf`, `name-2.pdf`, ...
    pub fn assign_path(&self, url: &Url, dir: &Path) -> PathBuf {
        let key = (dir.to_path_buf(), url.as_str().to_string());
        let mut registry = self.registry();

        if let Some(path) = registry.by_url.get(&key) {
            return path.clone();
        }

        let name = derive_filename(url);
        let mut path = dir.join(&name);
        let mut n = 0;
        while registry.owners.contains_key(&path) && n < MAX_SUFFIX {
            n += 1;
            path = dir.join(with_suffix(&name, n));
        }

        registry.owners.insert(path.clone(), key.1.clone());
        registry.by_url.insert(key, path.clone());
        path
    }

    /// Downloads `url` into `dir`
    ///
    /// When `require_pdf` is set the response must carry a PDF content type,
    /// otherwise the attempt fails with "not a PDF" and nothing is written.
    pub async fn download(
        &self,
        url: &Url,
        dir: &Path,
        require_pdf: bool,
        cancel: &CancellationToken,
    ) -> DownloadOutcome {
        let path = self.assign_path(url, dir);

        if self.sink.exists(&path) {
            tracing::debug!("{} already present at {}", url, path.display());
            return DownloadOutcome::AlreadyExists { path };
        }

        let request = self.client.get(url.clone()).timeout(self.timeout).send();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return DownloadOutcome::Cancelled,
            result = request => match result {
                Ok(response) => response,
                Err(e) => return failed(describe_error(&e), path),
            },
        };

        let status = response.status();
        if !status.is_success() {
            return failed(format!("HTTP {}", status.as_u16()), path);
        }

        let content_type = content_type_of(&response);
        if require_pdf && !is_pdf_content_type(&content_type) {
            let shown = if content_type.is_empty() {
                "none"
            } else {
                content_type.as_str()
            };
            return failed(format!("not a PDF (content type {})", shown), path);
        }

        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return DownloadOutcome::Cancelled,
            result = response.bytes() => match result {
                Ok(bytes) => bytes,
                Err(e) => return failed(describe_error(&e), path),
            },
        };

        let size = bytes.len() as u64;
        let sink = Arc::clone(&self.sink);
        let target = path.clone();
        let written = tokio::task::spawn_blocking(move || sink.write_file(&target, &bytes)).await;

        match written {
            Ok(Ok(())) => DownloadOutcome::Downloaded {
                path,
                size,
                content_type: (!content_type.is_empty()).then_some(content_type),
            },
            Ok(Err(e)) => failed(format!("write failed: {}", e), path),
            Err(e) => failed(format!("write task failed: {}", e), path),
        }
    }

    fn registry(&self) -> MutexGuard<'_, PathRegistry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn failed(reason: String, path: PathBuf) -> DownloadOutcome {
    DownloadOutcome::Failed {
        reason,
        path: Some(path),
    }
}
