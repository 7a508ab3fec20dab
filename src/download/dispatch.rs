use crate::download::Downloader;
use crate::state::{PdfRecord, PdfStatus, SharedLedger};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use url::Url;

/// Runs auto-downloads for one session in the background
///
/// Downloads are gated by their own semaphore so they never compete with
/// crawl workers for concurrency, and the discovering worker never waits.
#[derive(Debug, Clone)]
pub struct DownloadDispatcher {
    downloader: Arc<Downloader>,
    directory: PathBuf,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    cancel: CancellationToken,
    ledger: SharedLedger,
}

impl DownloadDispatcher {
    pub fn new(
        downloader: Arc<Downloader>,
        directory: PathBuf,
        concurrency: usize,
        ledger: SharedLedger,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            downloader,
            directory,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            tracker: TaskTracker::new(),
            cancel,
            ledger,
        }
    }

    /// Starts a download for a freshly submitted record
    pub fn dispatch(&self, record: &PdfRecord) {
        let url = match Url::parse(&record.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping download of {}: {}", record.url, e);
                return;
            }
        };
        let require_pdf = record.status == PdfStatus::Unverified;

        let downloader = Arc::clone(&self.downloader);
        let directory = self.directory.clone();
        let permits = Arc::clone(&self.permits);
        let cancel = self.cancel.clone();
        let ledger = self.ledger.clone();

        self.tracker.spawn(async move {
            let _permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                permit = permits.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };

            let outcome = downloader
                .download(&url, &directory, require_pdf, &cancel)
                .await;

            if let Some(updated) = ledger.update(url.as_str(), |rec| rec.apply_download(&outcome)) {
                match updated.status {
                    PdfStatus::DownloadFailed => tracing::warn!(
                        "Download failed for {}: {}",
                        updated.url,
                        updated.error.as_deref().unwrap_or("unknown error")
                    ),
                    status => tracing::debug!("{} -> {}", updated.url, status),
                }
            }
        });
    }

    /// Stops accepting downloads and waits for those in flight
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Downloads still queued or running
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }
}
