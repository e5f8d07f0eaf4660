//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop:
//! - Discovering categories once per run
//! - Walking each category's listing pages until the data runs out
//! - Extracting records from every page and accumulating them
//! - Pacing between pages and categories, honoring cancellation
//! - Handing the accumulated records to the sinks
//!
//! Each category runs through the same small state machine:
//!
//! ```text
//! Start -> FetchPage(n) -> records  -> Delay -> FetchPage(n + 1)
//!                       -> none     -> Done(NoRecords)
//!                       -> failure  -> Done(FetchFailed)
//!          n == max_pages           -> Done(PageCap)
//!          cancellation             -> Done(Cancelled)
//! ```

use crate::config::Config;
use crate::crawler::discovery::CategoryDiscoverer;
use crate::crawler::fetcher::{ResilientFetcher, RetryPolicy};
use crate::crawler::pacer::{DelayRange, Pacer};
use crate::crawler::transport::{
    FetchError, FetchResult, HttpTransport, IdentityPool, Transport, TransportProfile,
};
use crate::extract::{first_match, QuerySpec, RecordExtractor};
use crate::output::{open_sinks, write_summary};
use crate::state::{Category, CategoryProgress, CategoryStop, CrawlReport, CrawlState, Record};
use crate::url::page_url;
use crate::{ConfigError, TrawlError};
use scraper::Html;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main crawler structure
pub struct Crawler {
    discoverer: CategoryDiscoverer,
    extractor: RecordExtractor,
    listing_queries: Vec<QuerySpec>,
    fetcher: ResilientFetcher,
    pacer: Pacer,
    max_brands: Option<usize>,
    max_pages: u32,
    page_delay: DelayRange,
    category_delay: DelayRange,
}

impl Crawler {
    /// Creates a crawler talking HTTP through `reqwest`
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `cancel` - Token that stops the run when cancelled
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(TrawlError)` - Invalid base URL or HTTP client construction failure
    pub fn new(config: &Config, cancel: CancellationToken) -> Result<Self, TrawlError> {
        let origin = Url::parse(&config.site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.site.base_url, e)))?;
        let timeout = config.fetcher.timeout();

        let primary = HttpTransport::new(TransportProfile::Primary, timeout, &origin)?;
        let alternate = HttpTransport::new(TransportProfile::Alternate, timeout, &origin)?;

        Self::with_transports(config, Arc::new(primary), Some(Arc::new(alternate)), cancel)
    }

    /// Creates a crawler over arbitrary transports
    pub fn with_transports(
        config: &Config,
        primary: Arc<dyn Transport>,
        alternate: Option<Arc<dyn Transport>>,
        cancel: CancellationToken,
    ) -> Result<Self, TrawlError> {
        let seed = config.crawler.seed;
        let fetcher = ResilientFetcher::new(
            primary,
            alternate,
            IdentityPool::from_config(&config.identities),
            RetryPolicy::from_config(&config.fetcher),
            Pacer::new(seed, cancel.clone()),
        );

        Ok(Self {
            discoverer: CategoryDiscoverer::from_config(config)?,
            extractor: RecordExtractor::from_config(&config.selectors, &config.profile)?,
            listing_queries: QuerySpec::parse_all(&config.selectors.listing)?,
            fetcher,
            pacer: Pacer::new(seed.map(|s| s.wrapping_add(1)), cancel),
            max_brands: config.crawler.max_brands,
            max_pages: config.crawler.max_pages.max(1),
            page_delay: DelayRange::page(&config.pacing),
            category_delay: DelayRange::category(&config.pacing),
        })
    }

    /// Runs discovery and crawls every category in order
    ///
    /// Never fails: fetch and extraction problems end a category early and
    /// cancellation ends the run, but the records gathered so far are always
    /// returned.
    pub async fn run(&mut self) -> CrawlReport {
        let mut categories = self.discoverer.discover(&mut self.fetcher).await;
        if let Some(max_brands) = self.max_brands {
            categories.truncate(max_brands);
        }

        tracing::info!("Crawling {} categories", categories.len());

        let mut state = CrawlState::new();
        let total = categories.len();

        for (index, category) in categories.iter().enumerate() {
            if self.pacer.is_cancelled() {
                break;
            }

            tracing::info!("[{}/{}] Crawling category {}", index + 1, total, category.name);
            state = self.crawl_category(category, state).await;

            if index + 1 < total && self.pacer.pause(self.category_delay).await.is_err() {
                break;
            }
        }

        let cancelled = self.pacer.is_cancelled();
        if cancelled {
            tracing::warn!("Crawl cancelled with {} records collected", state.len());
        }

        state.into_report(cancelled)
    }

    /// Crawls the listing pages of one category
    ///
    /// Takes the run state and hands it back with this category's records
    /// appended and its outcome logged.
    pub async fn crawl_category(&mut self, category: &Category, mut state: CrawlState) -> CrawlState {
        let mut page = 1u32;
        let mut pages_fetched = 0u32;
        let mut records = 0usize;

        let stop = loop {
            let url = page_url(&category.seed_url, page);
            tracing::info!("Fetching page {} of {}: {}", page, category.name, url);

            let (body, final_url) = match self.fetcher.fetch_resilient(&url).await {
                FetchResult::Success {
                    body, final_url, ..
                } => (body, final_url),
                FetchResult::Failure {
                    kind: FetchError::Cancelled,
                    ..
                } => break CategoryStop::Cancelled,
                FetchResult::Failure { kind, attempts } => {
                    tracing::warn!(
                        "Giving up on {} page {} after {} attempts: {}",
                        category.name,
                        page,
                        attempts,
                        kind
                    );
                    break CategoryStop::FetchFailed;
                }
            };
            pages_fetched += 1;

            let page_records = self.process_page(&body, category, &final_url);
            if page_records.is_empty() {
                tracing::info!("No more listings for {} on page {}", category.name, page);
                break CategoryStop::NoRecords;
            }

            tracing::info!(
                "Extracted {} records from {} page {}",
                page_records.len(),
                category.name,
                page
            );
            records += page_records.len();
            state.append(page_records);

            if page >= self.max_pages {
                tracing::info!("Reached page cap of {} for {}", self.max_pages, category.name);
                break CategoryStop::PageCap;
            }

            match self.pacer.pause(self.page_delay).await {
                Ok(delay) => tracing::debug!("Waited {:?} before the next page", delay),
                Err(_) => break CategoryStop::Cancelled,
            }
            page += 1;
        };

        tracing::info!(
            "Finished {}: {} records from {} pages ({})",
            category.name,
            records,
            pages_fetched,
            stop
        );

        state.finish_category(CategoryProgress {
            name: category.name.clone(),
            pages_fetched,
            records,
            stop,
        });
        state
    }

    /// Parses a listing page and extracts one record per listing fragment
    ///
    /// Fragments that fail extraction are skipped. The parsed document never
    /// leaves this function.
    fn process_page(&self, body: &[u8], category: &Category, page_url: &Url) -> Vec<Record> {
        let document = Html::parse_document(&String::from_utf8_lossy(body));

        let Some(matched) = first_match(&&document, &self.listing_queries) else {
            return Vec::new();
        };

        tracing::debug!(
            "Found {} listings with selector '{}'",
            matched.items.len(),
            matched.query.as_str()
        );

        matched
            .items
            .iter()
            .filter_map(
                |fragment| match self.extractor.extract(*fragment, &category.name, page_url) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::debug!("Skipping listing on {}: {}", page_url, e);
                        None
                    }
                },
            )
            .collect()
    }
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire run:
///
/// 1. Open every configured sink (failing before any network traffic)
/// 2. Build the HTTP transports and the crawler
/// 3. Discover categories and crawl them
/// 4. Write the accumulated records to every sink exactly once
/// 5. Write the markdown summary when configured (failures are only logged)
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
/// * `cancel` - Token that stops the run gracefully
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Every sink was written
/// * `Err(TrawlError)` - A sink could not be opened or written
///
/// # Example
///
/// ```no_run
/// use catalog_trawler::config::load_config_with_hash;
/// use catalog_trawler::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("trawler.toml"))?;
/// let report = run_crawl(&config, &hash, CancellationToken::new()).await?;
/// println!("{} records", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    config_hash: &str,
    cancel: CancellationToken,
) -> Result<CrawlReport, TrawlError> {
    let mut sinks = open_sinks(&config.output, config_hash)?;
    let mut crawler = Crawler::new(config, cancel)?;

    let report = crawler.run().await;
    deliver(&report, &mut sinks)?;

    // Summary failures are logged, never fatal
    if let Some(path) = &config.output.summary_path {
        match write_summary(&report, config.site.display_name(), Path::new(path)) {
            Ok(()) => tracing::info!("Summary written to {}", path),
            Err(e) => tracing::warn!("Failed to write summary to {}: {}", path, e),
        }
    }

    Ok(report)
}

/// Hands the full record sequence to every sink once
pub fn deliver(
    report: &CrawlReport,
    sinks: &mut [Box<dyn crate::output::RecordSink>],
) -> Result<(), TrawlError> {
    if report.records.is_empty() {
        tracing::warn!("No records were extracted");
    }

    for sink in sinks.iter_mut() {
        if report.cancelled {
            sink.mark_cancelled();
        }
        sink.write(&report.records)?;
        tracing::info!("Wrote {} records to {}", report.records.len(), sink.describe());
    }
    Ok(())
}
