use crate::state::SessionPhase;
use serde::Serialize;

/// Read-only snapshot of a crawl session's progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStatus {
    pub is_running: bool,

    /// Maximum depth of any task dispatched so far
    pub current_depth: u32,

    /// Tasks dequeued and attempted, whatever their outcome
    pub urls_processed: u64,

    /// Distinct URLs claimed for crawling, the seed included
    pub urls_visited: usize,

    pub pdfs_found: usize,

    /// Set only when the session failed fatally
    pub error: Option<String>,
}

impl CrawlStatus {
    /// Status reported before any session has been started
    pub fn idle() -> Self {
        Self::default()
    }

    pub(crate) fn from_phase(
        phase: SessionPhase,
        current_depth: u32,
        urls_processed: u64,
        urls_visited: usize,
        pdfs_found: usize,
        error: Option<String>,
    ) -> Self {
        Self {
            is_running: phase.is_active(),
            current_depth,
            urls_processed,
            urls_visited,
            pdfs_found,
            error,
        }
    }
}
