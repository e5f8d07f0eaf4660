//! Accumulated state of one crawl run
//!
//! `CrawlState` is an append-only log of records plus the outcome of every
//! finished category. It is owned by the crawler for the duration of a run
//! and turned into a `CrawlReport` for the sinks at the end.

use crate::state::{CategoryStop, Record};
use chrono::{DateTime, Utc};

/// Outcome of crawling a single category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryProgress {
    /// Category name
    pub name: String,

    /// Listing pages fetched successfully
    pub pages_fetched: u32,

    /// Records appended from this category
    pub records: usize,

    /// Why the category ended
    pub stop: CategoryStop,
}

/// Mutable state of a run in progress
#[derive(Debug)]
pub struct CrawlState {
    records: Vec<Record>,
    progress: Vec<CategoryProgress>,
    started_at: DateTime<Utc>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            progress: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Appends the records of one page; existing records are never touched
    pub fn append(&mut self, records: Vec<Record>) {
        self.records.extend(records);
    }

    /// Records the outcome of a finished category
    pub fn finish_category(&mut self, progress: CategoryProgress) {
        self.progress.push(progress);
    }

    /// Records accumulated so far, in extraction order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Outcomes of the categories finished so far
    pub fn categories(&self) -> &[CategoryProgress] {
        &self.progress
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Closes the run and hands the accumulated data over
    pub fn into_report(self, cancelled: bool) -> CrawlReport {
        CrawlReport {
            records: self.records,
            categories: self.progress,
            cancelled,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}

/// Final result of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Every record extracted, in order
    pub records: Vec<Record>,

    /// Per-category outcomes, in crawl order
    pub categories: Vec<CategoryProgress>,

    /// Whether the run was cut short by cancellation
    pub cancelled: bool,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Total listing pages fetched across all categories
    pub fn total_pages(&self) -> u32 {
        self.categories.iter().map(|c| c.pages_fetched).sum()
    }

    /// Number of categories that ended with the given stop reason
    pub fn count_stopped(&self, stop: CategoryStop) -> usize {
        self.categories.iter().filter(|c| c.stop == stop).count()
    }

    /// Run duration in whole seconds
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}
