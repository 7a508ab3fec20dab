//! Crawl session state and the driver task that runs it
//!
//! A session owns everything one crawl mutates: the frontier, the visited
//! set, the PDF ledger and the progress counters. The controller creates a
//! fresh session per start, so nothing leaks between crawls.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::visited::VisitedSet;
use crate::crawler::worker::run_worker;
use crate::download::DownloadDispatcher;
use crate::state::{CrawlStatus, PdfRecord, PdfStatus, SessionPhase, SharedLedger, Submission};
use crate::url::CrawlScope;
use crate::TrawlError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Shared state of one crawl session
#[derive(Debug)]
pub(crate) struct Session {
    phase: Mutex<SessionPhase>,
    error: Mutex<Option<String>>,
    urls_processed: AtomicU64,
    pub(crate) ledger: SharedLedger,
    pub(crate) frontier: Arc<Frontier>,
    pub(crate) visited: VisitedSet,
    pub(crate) scope: CrawlScope,
    pub(crate) cancel: CancellationToken,
    pub(crate) probe_unverified: bool,
    downloads: Option<DownloadDispatcher>,
    finished: CancellationToken,
}

impl Session {
    pub(crate) fn new(
        max_depth: u32,
        scope: CrawlScope,
        probe_unverified: bool,
        ledger: SharedLedger,
        cancel: CancellationToken,
        downloads: Option<DownloadDispatcher>,
    ) -> Self {
        Self {
            phase: Mutex::new(SessionPhase::Idle),
            error: Mutex::new(None),
            urls_processed: AtomicU64::new(0),
            ledger,
            frontier: Arc::new(Frontier::new(max_depth)),
            visited: VisitedSet::new(),
            scope,
            cancel,
            probe_unverified,
            downloads,
            finished: CancellationToken::new(),
        }
    }

    pub(crate) fn phase(&self) -> SessionPhase {
        *lock(&self.phase)
    }

    /// Moves to `next` if the transition is legal; returns whether it happened
    pub(crate) fn transition(&self, next: SessionPhase) -> bool {
        let mut phase = lock(&self.phase);
        if phase.can_transition_to(next) {
            tracing::debug!("Session {} -> {}", *phase, next);
            *phase = next;
            true
        } else {
            false
        }
    }

    /// Records a fatal error and moves to `Errored`
    pub(crate) fn fail(&self, error: TrawlError) {
        tracing::error!("{}", error);
        *lock(&self.error) = Some(error.to_string());
        self.transition(SessionPhase::Errored);
    }

    pub(crate) fn count_processed(&self) {
        self.urls_processed.fetch_add(1, Ordering::SeqCst);
    }

    /// Submits a PDF to the ledger, starting a download for new records
    pub(crate) fn record_pdf(
        &self,
        url: &Url,
        source: &Url,
        status: PdfStatus,
        content_type: Option<String>,
    ) {
        let record = PdfRecord::new(url, source, status).with_content_type(content_type);

        match self.ledger.submit(record) {
            Submission::New(record) => {
                tracing::info!("Found PDF ({}): {}", record.status, record.url);
                if let Some(downloads) = &self.downloads {
                    downloads.dispatch(&record);
                }
            }
            Submission::Upgraded(record) => {
                tracing::info!("Confirmed PDF: {}", record.url);
            }
            Submission::Duplicate => {}
        }
    }

    pub(crate) fn status(&self) -> CrawlStatus {
        CrawlStatus::from_phase(
            self.phase(),
            self.frontier.max_dispatched_depth(),
            self.urls_processed.load(Ordering::SeqCst),
            self.visited.len(),
            self.ledger.len(),
            lock(&self.error).clone(),
        )
    }

    pub(crate) fn results(&self) -> Vec<PdfRecord> {
        self.ledger.snapshot()
    }

    /// Cancels in-flight work and closes the frontier
    pub(crate) fn shut_down(&self) {
        self.cancel.cancel();
        self.frontier.close();
    }

    /// Marks the driver as gone; every [`finished`](Self::finished) waiter returns
    pub(crate) fn mark_finished(&self) {
        self.finished.cancel();
    }

    /// Resolves once the driver has exited and the phase is final
    ///
    /// Any number of callers may wait at once.
    pub(crate) async fn finished(&self) {
        self.finished.cancelled().await;
    }
}

/// Runs the worker pool to completion, then waits for auto-downloads
///
/// Ends in `Idle` on natural completion or after a stop, or in `Errored` if
/// any worker panicked.
pub(crate) async fn drive(session: Arc<Session>, fetcher: Fetcher, workers: usize) {
    let mut pool = JoinSet::new();
    for id in 0..workers.max(1) {
        pool.spawn(run_worker(id, Arc::clone(&session), fetcher.clone()));
    }

    let mut fatal: Option<TrawlError> = None;
    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() && fatal.is_none() {
                fatal = Some(TrawlError::SessionFatal(format!("worker panicked: {}", e)));
                session.shut_down();
            }
        }
    }

    if let Some(downloads) = &session.downloads {
        if downloads.in_flight() > 0 {
            tracing::info!("Waiting for {} downloads to finish", downloads.in_flight());
        }
        downloads.drain().await;
    }

    match fatal {
        Some(error) => session.fail(error),
        None => {
            let status = session.status();
            tracing::info!(
                "Crawl finished: {} URLs processed, {} PDFs found",
                status.urls_processed,
                status.pdfs_found
            );
            session.transition(SessionPhase::Idle);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
