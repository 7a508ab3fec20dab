//! Markdown summary generation
//!
//! Renders a finished (or stopped) session as a human-readable report:
//! run information, status counts, and one table row per PDF.

use crate::output::stats::ResultStatistics;
use crate::output::CrawlSummary;
use crate::state::PdfStatus;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Rows listed before the PDF table is truncated
const MAX_TABLE_ROWS: usize = 500;

/// Writes the markdown summary to `output_path`
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let stats = ResultStatistics::from_records(&summary.records);
    let mut md = String::new();

    md.push_str("# PDF Trawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed URL**: {}\n", summary.seed_url));
    md.push_str(&format!("- **Max Depth**: {}\n", summary.max_depth));
    md.push_str(&format!(
        "- **Started**: {}\n",
        summary.started_at.to_rfc3339()
    ));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
        let seconds = (*finished - summary.started_at).num_seconds().max(0);
        md.push_str(&format!("- **Duration**: {} seconds\n", seconds));
    }
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    if let Some(error) = &summary.status.error {
        md.push_str(&format!("- **Error**: {}\n", error));
    }
    md.push('\n');

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **URLs Processed**: {}\n",
        summary.status.urls_processed
    ));
    md.push_str(&format!(
        "- **URLs Visited**: {}\n",
        summary.status.urls_visited
    ));
    md.push_str(&format!(
        "- **Deepest Level Reached**: {}\n",
        summary.status.current_depth
    ));
    md.push_str(&format!("- **PDFs Found**: {}\n", stats.total_pdfs));
    md.push_str(&format!("- **Pages With PDFs**: {}\n", stats.source_pages));
    if stats.bytes_downloaded > 0 {
        md.push_str(&format!(
            "- **Bytes Downloaded**: {}\n",
            stats.bytes_downloaded
        ));
    }
    md.push('\n');

    md.push_str("## Status Breakdown\n\n");
    md.push_str("| Status | Count |\n");
    md.push_str("|--------|-------|\n");
    for status in PdfStatus::all_states() {
        md.push_str(&format!("| {} | {} |\n", status, stats.count(status)));
    }
    md.push('\n');

    if !summary.records.is_empty() {
        md.push_str("## PDFs\n\n");
        md.push_str("| File | Status | Size | URL | Found On |\n");
        md.push_str("|------|--------|------|-----|----------|\n");

        for record in summary.records.iter().take(MAX_TABLE_ROWS) {
            let size = record
                .size
                .map(|bytes| bytes.to_string())
                .unwrap_or_else(|| "-".to_string());
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                escape_cell(&record.filename),
                record.status,
                size,
                record.url,
                record.source_url
            ));
        }

        if summary.records.len() > MAX_TABLE_ROWS {
            md.push_str(&format!(
                "\n... and {} more\n",
                summary.records.len() - MAX_TABLE_ROWS
            ));
        }
        md.push('\n');
    }

    if !stats.failures.is_empty() {
        md.push_str("## Failed Downloads\n\n");
        for (url, reason) in &stats.failures {
            md.push_str(&format!("- {} ({})\n", url, reason));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
