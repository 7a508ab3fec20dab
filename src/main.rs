//! pdf-trawl main entry point
//!
//! This is the command-line interface for the pdf-trawl PDF discovery crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pdf_trawl::config::{load_config_with_hash, Config};
use pdf_trawl::output::{generate_markdown_summary, print_statistics, CrawlSummary, ResultStatistics};
use pdf_trawl::{CrawlController, PdfRecord, PdfStatus, StartRequest};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How often the crawl command polls session status
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// pdf-trawl: a depth-bounded PDF discovery crawler
///
/// Crawls a website up to a link depth limit, lists every PDF it finds and
/// optionally downloads them.
#[derive(Parser, Debug)]
#[command(name = "pdf-trawl")]
#[command(version)]
#[command(about = "Find and download the PDFs on a website", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a website and report the PDFs found
    Crawl {
        /// Seed URL; https:// is assumed when no scheme is given
        url: String,

        /// Maximum link depth from the seed (1-10)
        #[arg(short = 'd', long)]
        max_depth: Option<u32>,

        /// Directory for downloaded PDFs
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,

        /// Download every PDF as soon as it is found
        #[arg(long)]
        auto_download: bool,

        /// Download the PDFs found once the crawl has finished
        #[arg(long, conflicts_with = "auto_download")]
        download_found: bool,

        /// Number of concurrent fetch workers
        #[arg(long)]
        concurrency: Option<usize>,

        /// Write a markdown summary to this file
        #[arg(long, value_name = "FILE")]
        summary: Option<PathBuf>,

        /// Print results as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Download a single PDF
    Download {
        /// URL of the PDF
        url: String,

        /// Target directory
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Validate the configuration and print the effective settings
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(cli.config.as_ref())?;

    match cli.command {
        Command::Crawl {
            url,
            max_depth,
            download_dir,
            auto_download,
            download_found,
            concurrency,
            summary,
            json,
        } => {
            let mut config = config;
            if let Some(concurrency) = concurrency {
                config.crawler.concurrency = concurrency;
            }

            let mut request = StartRequest::from_config(url, &config);
            if let Some(depth) = max_depth {
                request.max_depth = depth;
            }
            if download_dir.is_some() {
                request.download_dir = download_dir;
            }
            request.auto_download |= auto_download;

            let options = CrawlOptions {
                download_found,
                summary,
                json,
            };
            handle_crawl(config, config_hash, request, options).await
        }
        Command::Download { url, dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from(&config.download.directory));
            handle_download(config, &url, dir).await
        }
        Command::CheckConfig => {
            handle_check_config(&config, config_hash.as_deref());
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pdf_trawl=info,warn"),
            1 => EnvFilter::new("pdf_trawl=debug,info"),
            2 => EnvFilter::new("pdf_trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<(Config, Option<String>)> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok((Config::default(), None));
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok((config, Some(hash)))
}

/// What the crawl command does once the session ends
struct CrawlOptions {
    download_found: bool,
    summary: Option<PathBuf>,
    json: bool,
}

/// Runs a crawl to completion (or Ctrl-C) and reports the results
async fn handle_crawl(
    config: Config,
    config_hash: Option<String>,
    request: StartRequest,
    options: CrawlOptions,
) -> anyhow::Result<()> {
    let download_dir = request
        .download_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.download.directory));
    let controller = CrawlController::new(config)?;
    let seed_url = request.website_url.clone();
    let max_depth = request.max_depth;
    let started_at = chrono::Utc::now();
    let mut interrupted = false;

    controller.start_crawl(request).await?;

    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut last_reported = (0, 0);
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            _ = &mut interrupt => {
                tracing::info!("Interrupted, stopping crawl");
                controller.stop_crawl().await;
                interrupted = true;
                break;
            }
            _ = ticker.tick() => {
                let status = controller.status();
                if !status.is_running {
                    break;
                }
                let progress = (status.urls_processed, status.pdfs_found);
                if progress != last_reported {
                    tracing::info!(
                        "Depth {}, {} URLs processed, {} PDFs found",
                        status.current_depth,
                        status.urls_processed,
                        status.pdfs_found
                    );
                    last_reported = progress;
                }
            }
        }
    }

    if options.download_found && !interrupted {
        let attempted = controller.download_all(&download_dir).await?;
        let saved = attempted
            .iter()
            .filter(|record| record.status != PdfStatus::DownloadFailed)
            .count();
        tracing::info!(
            "Downloaded {} of {} PDFs to {}",
            saved,
            attempted.len(),
            download_dir.display()
        );
    }

    let status = controller.status();
    let records = controller.results();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_results(&records);
        print_statistics(&ResultStatistics::from_records(&records), &status);
    }

    if let Some(path) = options.summary {
        let summary = CrawlSummary {
            seed_url,
            max_depth,
            started_at,
            finished_at: Some(chrono::Utc::now()),
            config_hash,
            status: status.clone(),
            records,
        };
        generate_markdown_summary(&summary, &path)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        println!("✓ Summary exported to: {}", path.display());
    }

    if let Some(error) = status.error {
        anyhow::bail!("crawl failed: {}", error);
    }

    Ok(())
}

/// Handles the download subcommand
async fn handle_download(config: Config, url: &str, dir: PathBuf) -> anyhow::Result<()> {
    let controller = CrawlController::new(config)?;
    let report = controller.download_pdf(url, &dir).await?;

    match report.size {
        Some(size) => println!(
            "✓ {} ({}, {} bytes) -> {}",
            report.filename,
            report.status,
            size,
            report.path.display()
        ),
        None => println!(
            "✓ {} ({}) -> {}",
            report.filename,
            report.status,
            report.path.display()
        ),
    }

    Ok(())
}

/// Handles the check-config subcommand: shows the effective configuration
fn handle_check_config(config: &Config, hash: Option<&str>) {
    println!("=== pdf-trawl Configuration ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!("  Same site only: {}", config.crawler.same_site_only);
    println!("  Probe unverified: {}", config.crawler.probe_unverified);
    println!(
        "  Skipped extensions: {}",
        config.crawler.skip_extensions.join(", ")
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nDownload:");
    println!("  Directory: {}", config.download.directory);
    println!("  Auto-download: {}", config.download.auto_download);
    println!("  Concurrency: {}", config.download.concurrency);
    println!("  Timeout: {}s", config.download.timeout_secs);

    match hash {
        Some(hash) => println!("\n✓ Configuration is valid (hash: {})", hash),
        None => println!("\n✓ Using built-in defaults"),
    }
}

fn print_results(records: &[PdfRecord]) {
    if records.is_empty() {
        println!("No PDFs found.\n");
        return;
    }

    println!("{:<16} {:<40} URL", "STATUS", "FILE");
    for record in records {
        println!(
            "{:<16} {:<40} {}",
            record.status.as_str(),
            record.filename,
            record.url
        );
    }
    println!();
}
