//! Configuration module for pdf-trawl
//!
//! Loads, parses and validates the optional TOML configuration file. Every key
//! has a default, so the crawler runs without one.
//!
//! # Example
//!
//! ```no_run
//! use pdf_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pdf-trawl.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, DownloadConfig, UserAgentConfig, DEFAULT_SKIP_EXTENSIONS};
pub use validation::{validate, MAX_DEPTH, MIN_DEPTH};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
