//! Public entry point for running crawls
//!
//! [`CrawlController`] owns the single session slot of a process. Callers
//! start and stop sessions through it and poll [`CrawlController::status`]
//! and [`CrawlController::results`] for snapshots.

use crate::classify::{classify_url, Confidence};
use crate::config::{Config, MAX_DEPTH, MIN_DEPTH};
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::frontier::CrawlTask;
use crate::crawler::session::{drive, Session};
use crate::download::{
    DownloadDispatcher, DownloadOutcome, DownloadReport, Downloader, FsSink,
};
use crate::state::{CrawlStatus, PdfRecord, PdfStatus, SessionPhase, SharedLedger};
use crate::url::{normalize_input, CrawlScope};
use crate::{Result, TrawlError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Parameters for a new crawl session
#[derive(Debug, Clone)]
pub struct StartRequest {
    /// Seed URL as typed by the user; a missing scheme means https
    pub website_url: String,

    /// Link depth limit, 1..=10
    pub max_depth: u32,

    /// Target directory for auto-downloads
    pub download_dir: Option<PathBuf>,

    /// Download every PDF as soon as it is found
    pub auto_download: bool,
}

impl StartRequest {
    /// Builds a request with depth and download settings taken from `config`
    pub fn from_config(website_url: impl Into<String>, config: &Config) -> Self {
        Self {
            website_url: website_url.into(),
            max_depth: config.crawler.max_depth,
            download_dir: Some(PathBuf::from(&config.download.directory)),
            auto_download: config.download.auto_download,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_DEPTH..=MAX_DEPTH).contains(&self.max_depth) {
            return Err(TrawlError::InvalidArgument(format!(
                "max depth must be between {} and {} (got {})",
                MIN_DEPTH, MAX_DEPTH, self.max_depth
            )));
        }

        if self.auto_download && self.target_dir().is_none() {
            return Err(TrawlError::InvalidArgument(
                "auto-download requires a download directory".to_string(),
            ));
        }

        Ok(())
    }

    fn target_dir(&self) -> Option<&Path> {
        self.download_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}

struct Inner {
    config: Config,
    fetcher: Fetcher,
    downloader: Arc<Downloader>,
    session: Mutex<Option<Arc<Session>>>,
}

/// Coordinator for crawl sessions and on-demand downloads
///
/// Cheap to clone; all clones share the same session slot.
#[derive(Clone)]
pub struct CrawlController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CrawlController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrawlController")
            .field("status", &self.status())
            .finish()
    }
}

impl CrawlController {
    /// Creates a controller and its HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;

        let downloader = Downloader::new(
            client.clone(),
            Arc::new(FsSink),
            Duration::from_secs(config.download.timeout_secs),
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                fetcher: Fetcher::new(client),
                downloader: Arc::new(downloader),
                session: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Starts a new crawl session
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the depth is out of range or auto-download has
    ///   no directory
    /// - `InvalidUrl` if the seed cannot be normalized
    /// - `AlreadyRunning` if a session is running or stopping
    ///
    /// A failed start leaves the previous session untouched.
    pub async fn start_crawl(&self, request: StartRequest) -> Result<()> {
        request.validate()?;
        let seed = normalize_input(&request.website_url)?;

        let mut slot = self.slot();
        if let Some(current) = slot.as_ref() {
            if current.phase().is_active() {
                return Err(TrawlError::AlreadyRunning);
            }
        }

        let config = &self.inner.config;
        let cancel = CancellationToken::new();
        let ledger = SharedLedger::new();

        let downloads = match (request.auto_download, request.target_dir()) {
            (true, Some(dir)) => Some(DownloadDispatcher::new(
                Arc::clone(&self.inner.downloader),
                dir.to_path_buf(),
                config.download.concurrency,
                ledger.clone(),
                cancel.clone(),
            )),
            _ => None,
        };

        let scope = CrawlScope::new(
            &seed,
            config.crawler.same_site_only,
            &config.crawler.skip_extensions,
        );

        let session = Arc::new(Session::new(
            request.max_depth,
            scope,
            config.crawler.probe_unverified,
            ledger,
            cancel,
            downloads,
        ));

        session.visited.try_claim(&seed);
        session.frontier.push(CrawlTask::seed(seed.clone()));
        session.transition(SessionPhase::Running);

        tracing::info!(
            "Starting crawl of {} (max depth {}, {} workers{})",
            seed,
            request.max_depth,
            config.crawler.concurrency,
            if request.auto_download {
                ", auto-download"
            } else {
                ""
            }
        );

        let driver = tokio::spawn(drive(
            Arc::clone(&session),
            self.inner.fetcher.clone(),
            config.crawler.concurrency,
        ));
        tokio::spawn(supervise(Arc::clone(&session), driver));

        *slot = Some(session);
        Ok(())
    }

    /// Stops the active session and waits for its workers to exit
    ///
    /// A no-op when nothing is running.
    pub async fn stop_crawl(&self) {
        let Some(session) = self.current_session() else {
            return;
        };

        if session.transition(SessionPhase::Stopping) {
            tracing::info!("Stopping crawl");
        }
        session.shut_down();
        session.finished().await;
    }

    /// Snapshot of the current (or last) session's progress
    pub fn status(&self) -> CrawlStatus {
        match self.current_session() {
            Some(session) => session.status(),
            None => CrawlStatus::idle(),
        }
    }

    /// Snapshot of the current (or last) session's records, in discovery order
    pub fn results(&self) -> Vec<PdfRecord> {
        self.current_session()
            .map(|session| session.results())
            .unwrap_or_default()
    }

    /// Waits until the current session is no longer running
    ///
    /// Safe to call from several tasks, and alongside [`stop_crawl`](Self::stop_crawl).
    pub async fn wait(&self) {
        if let Some(session) = self.current_session() {
            session.finished().await;
        }
    }

    /// Downloads a single PDF on demand
    ///
    /// Works with or without an active session. When the URL matches a
    /// record of the current session, that record is updated in place.
    ///
    /// # Errors
    ///
    /// `InvalidUrl` for an unusable URL, `DownloadFailure` when the fetch or
    /// write fails.
    pub async fn download_pdf(&self, url: &str, download_dir: &Path) -> Result<DownloadReport> {
        let url = normalize_input(url)?;
        let session = self.current_session();

        let record = session.as_ref().and_then(|s| s.ledger.get(url.as_str()));
        let require_pdf = needs_content_check(record.as_ref(), &url);

        let outcome = self
            .inner
            .downloader
            .download(&url, download_dir, require_pdf, &CancellationToken::new())
            .await;

        if let Some(session) = &session {
            session
                .ledger
                .update(url.as_str(), |record| record.apply_download(&outcome));
        }

        let (path, status, size) = match outcome {
            DownloadOutcome::Downloaded { path, size, .. } => {
                (path, PdfStatus::Downloaded, Some(size))
            }
            DownloadOutcome::AlreadyExists { path } => (path, PdfStatus::AlreadyExists, None),
            DownloadOutcome::Failed { reason, .. } => {
                tracing::warn!("Download failed for {}: {}", url, reason);
                return Err(TrawlError::DownloadFailure {
                    url: url.to_string(),
                    message: reason,
                });
            }
            DownloadOutcome::Cancelled => {
                return Err(TrawlError::DownloadFailure {
                    url: url.to_string(),
                    message: "cancelled".to_string(),
                })
            }
        };

        tracing::info!("Saved {} to {}", url, path.display());

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(DownloadReport {
            ok: true,
            url: url.to_string(),
            filename,
            path,
            status,
            size,
        })
    }

    /// Downloads every record of the last session that has not been tried yet
    ///
    /// Records still `found` or `unverified` are fetched on the download
    /// concurrency budget, and each outcome updates its record in place.
    /// Returns those records as they stand afterwards, in discovery order.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` while a session is active, `InvalidArgument` for an
    /// empty directory.
    pub async fn download_all(&self, download_dir: &Path) -> Result<Vec<PdfRecord>> {
        if download_dir.as_os_str().is_empty() {
            return Err(TrawlError::InvalidArgument(
                "download directory must not be empty".to_string(),
            ));
        }

        let Some(session) = self.current_session() else {
            return Ok(Vec::new());
        };
        if session.phase().is_active() {
            return Err(TrawlError::AlreadyRunning);
        }

        let pending: Vec<PdfRecord> = session
            .results()
            .into_iter()
            .filter(|record| record.status.is_discovery())
            .collect();
        if pending.is_empty() {
            return Ok(pending);
        }

        tracing::info!(
            "Downloading {} PDFs to {}",
            pending.len(),
            download_dir.display()
        );

        let dispatcher = DownloadDispatcher::new(
            Arc::clone(&self.inner.downloader),
            download_dir.to_path_buf(),
            self.inner.config.download.concurrency,
            session.ledger.clone(),
            CancellationToken::new(),
        );
        for record in &pending {
            dispatcher.dispatch(record);
        }
        dispatcher.drain().await;

        Ok(pending
            .iter()
            .filter_map(|record| session.ledger.get(&record.url))
            .collect())
    }

    fn current_session(&self) -> Option<Arc<Session>> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<Session>>> {
        self.inner.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Records a driver panic, then releases everyone waiting on the session
async fn supervise(session: Arc<Session>, driver: JoinHandle<()>) {
    if let Err(e) = driver.await {
        if e.is_panic() {
            session.fail(TrawlError::SessionFatal(format!(
                "session driver panicked: {}",
                e
            )));
        }
    }
    session.mark_finished();
}

/// Whether a download must see a PDF content type before writing
///
/// Confirmed records skip the check. Unconfirmed ones need it, as do URLs
/// without a record or with a failed attempt, unless they end in `.pdf`.
fn needs_content_check(record: Option<&PdfRecord>, url: &Url) -> bool {
    match record.map(|record| record.status) {
        Some(PdfStatus::Unverified) => true,
        Some(PdfStatus::DownloadFailed) | None => {
            classify_url(url) != Some(Confidence::Confident)
        }
        Some(_) => false,
    }
}
