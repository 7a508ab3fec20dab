//! Crawler module for page fetching and PDF discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and HEAD probing
//! - HTML parsing and link extraction
//! - The depth-bounded frontier and visited set
//! - The worker pool and session lifecycle behind [`CrawlController`]

mod controller;
pub(crate) mod fetcher;
mod frontier;
mod parser;
mod session;
mod visited;
mod worker;

pub use controller::{CrawlController, StartRequest};
pub use fetcher::{build_http_client, FetchResult, Fetcher, ProbeOutcome};
pub use frontier::{CrawlTask, Frontier, TaskLease};
pub use parser::{parse_html, DiscoveredLink, LinkKind, ParsedPage};
pub use visited::VisitedSet;
