//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a run:
//! run metadata, per-category outcomes and field coverage.

use crate::output::stats::RunStatistics;
use crate::output::traits::SinkResult;
use crate::state::{CategoryStop, CrawlReport};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a run
///
/// # Arguments
///
/// * `report` - The finished run
/// * `site_name` - Name of the crawled site, used in the title
/// * `output_path` - Path where the markdown file should be written
pub fn write_summary(report: &CrawlReport, site_name: &str, output_path: &Path) -> SinkResult<()> {
    let markdown = format_markdown_summary(report, site_name);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run as markdown
pub fn format_markdown_summary(report: &CrawlReport, site_name: &str) -> String {
    let stats = RunStatistics::from_report(report);
    let mut md = String::new();

    md.push_str(&format!("# Catalog Trawl Summary: {}\n\n", site_name));

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    let duration = report.duration_seconds();
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2} minutes)\n",
        duration,
        duration as f64 / 60.0
    ));
    let status = if report.cancelled { "cancelled" } else { "completed" };
    md.push_str(&format!("- **Status**: {}\n\n", status));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Total Records**: {}\n", stats.total_records));
    md.push_str(&format!("- **Categories Crawled**: {}\n", report.categories.len()));
    md.push_str(&format!("- **Pages Fetched**: {}\n", report.total_pages()));
    md.push_str(&format!(
        "- **Categories Ended Early**: {}\n\n",
        report.categories.iter().filter(|c| c.stop.is_early()).count()
    ));

    // Category outcomes
    if !report.categories.is_empty() {
        md.push_str("## Categories\n\n");
        md.push_str("| Category | Pages | Records | Stop Reason |\n");
        md.push_str("|----------|-------|---------|-------------|\n");
        for category in &report.categories {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                category.name, category.pages_fetched, category.records, category.stop
            ));
        }
        md.push('\n');

        md.push_str("## Stop Reasons\n\n");
        md.push_str("| Reason | Categories |\n");
        md.push_str("|--------|------------|\n");
        for stop in CategoryStop::all() {
            let count = report.count_stopped(stop);
            if count > 0 {
                md.push_str(&format!("| {} | {} |\n", stop, count));
            }
        }
        md.push('\n');
    }

    // Field coverage
    if stats.total_records > 0 {
        md.push_str("## Field Coverage\n\n");
        md.push_str("| Field | Filled | Coverage |\n");
        md.push_str("|-------|--------|----------|\n");
        for (field, filled) in &stats.field_fill {
            md.push_str(&format!(
                "| {} | {} | {:.1}% |\n",
                field,
                filled,
                stats.coverage(*field)
            ));
        }
        md.push('\n');
    }

    md
}
