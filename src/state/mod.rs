//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PdfStatus`: lifecycle of a discovered PDF (found, unverified, downloaded, ...)
//! - `PdfRecord` / `PdfLedger`: the insertion-ordered result set of a session
//! - `SessionPhase`: the crawl session state machine
//! - `CrawlStatus`: the progress snapshot handed to callers

mod pdf_status;
mod records;
mod session_phase;
mod status;

pub use pdf_status::PdfStatus;
pub use records::{PdfLedger, PdfRecord, SharedLedger, Submission};
pub use session_phase::SessionPhase;
pub use status::CrawlStatus;
