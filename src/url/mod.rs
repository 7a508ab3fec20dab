//! URL handling module for pdf-trawl
//!
//! This module canonicalizes seed input and discovered links, and decides
//! which pages fall inside the crawl scope.

mod normalize;
mod scope;

pub(crate) use normalize::canonicalize;
pub use normalize::{normalize_input, resolve_link};
pub use scope::{extract_domain, path_extension, CrawlScope};
