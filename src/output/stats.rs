//! Statistics over a finished run
//!
//! This module computes per-brand counts and field coverage from a crawl
//! report and prints them for the operator.

use crate::state::{CategoryStop, CrawlReport, Field};
use std::collections::BTreeMap;

/// Run statistics summary
#[derive(Debug, Clone)]
pub struct RunStatistics {
    /// Total number of records extracted
    pub total_records: usize,

    /// Records per brand, sorted by brand name
    pub records_by_brand: BTreeMap<String, usize>,

    /// Number of records with a non-empty value, per field in output order
    pub field_fill: Vec<(Field, usize)>,
}

impl RunStatistics {
    pub fn from_report(report: &CrawlReport) -> Self {
        let mut records_by_brand = BTreeMap::new();
        for record in &report.records {
            *records_by_brand.entry(record.brand().to_string()).or_insert(0) += 1;
        }

        let field_fill = Field::all()
            .into_iter()
            .map(|field| {
                let filled = report
                    .records
                    .iter()
                    .filter(|record| !record.get(field).is_empty())
                    .count();
                (field, filled)
            })
            .collect();

        Self {
            total_records: report.records.len(),
            records_by_brand,
            field_fill,
        }
    }

    /// Percentage of records with a value for `field`
    pub fn coverage(&self, field: Field) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        let filled = self
            .field_fill
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        (filled as f64 / self.total_records as f64) * 100.0
    }
}

/// Prints run statistics to stdout in a formatted manner
pub fn print_statistics(report: &CrawlReport) {
    let stats = RunStatistics::from_report(report);

    println!("=== Trawl Statistics ===\n");

    println!("Overview:");
    println!("  Records extracted: {}", stats.total_records);
    println!("  Categories crawled: {}", report.categories.len());
    println!("  Pages fetched: {}", report.total_pages());
    println!("  Duration: {} seconds", report.duration_seconds());
    if report.cancelled {
        println!("  Run was cancelled before completion");
    }
    println!();

    println!("Categories by Stop Reason:");
    for stop in CategoryStop::all() {
        let count = report.count_stopped(stop);
        if count > 0 {
            println!("  {}: {}", stop, count);
        }
    }
    println!();

    if !stats.records_by_brand.is_empty() {
        println!("Records by Brand:");
        // Sort brands by count (descending)
        let mut brand_counts: Vec<_> = stats.records_by_brand.iter().collect();
        brand_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (brand, count) in brand_counts {
            println!("  {}: {}", brand, count);
        }
        println!();

        println!("Field Coverage:");
        for (field, filled) in &stats.field_fill {
            println!(
                "  {}: {} ({:.1}%)",
                field,
                filled,
                stats.coverage(*field)
            );
        }
    }
}
