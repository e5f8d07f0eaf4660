use crate::config::defaults;
use crate::state::Field;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Main configuration structure for Catalog Trawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(rename = "identity", default = "default_identities")]
    pub identities: Vec<IdentityConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site description
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Human-readable site name used in logs and reports
    #[serde(default)]
    pub name: Option<String>,

    /// Absolute base URL of the site (e.g., "https://www.example.com")
    pub base_url: String,

    /// Structured-data endpoints probed for the category list, in order
    #[serde(default = "default_api_endpoints")]
    pub api_endpoints: Vec<String>,

    /// Listing-root pages scanned for category links, in order
    #[serde(default = "default_listing_roots")]
    pub listing_roots: Vec<String>,

    /// Seed URL template with `{base}` and `{slug}` placeholders
    #[serde(default = "default_seed_template")]
    pub seed_template: String,

    /// Category slugs used when neither probe finds anything
    #[serde(default = "default_fallback_categories")]
    pub fallback_categories: Vec<String>,
}

impl SiteConfig {
    /// Returns the configured name or the base URL
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.base_url)
    }
}

/// Crawl loop limits
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of categories to crawl (all when unset)
    #[serde(default)]
    pub max_brands: Option<usize>,

    /// Maximum listing pages fetched per category
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Seed for identity and delay randomization (OS entropy when unset)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Wall-clock budget for the whole run in seconds
    #[serde(default)]
    pub run_budget_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_brands: None,
            max_pages: default_max_pages(),
            seed: None,
            run_budget_secs: None,
        }
    }
}

/// Retry and escalation policy for a single URL
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// Attempts through the primary transport
    #[serde(default = "default_attempts")]
    pub attempts_per_fetch: u32,

    /// Minimum wait between attempts (milliseconds)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Random extra wait added to the retry delay (milliseconds)
    #[serde(default = "default_retry_jitter_ms")]
    pub retry_jitter_ms: u64,

    /// Whether to make one final attempt through the alternate transport
    #[serde(default = "default_true")]
    pub escalate_to_alt: bool,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            attempts_per_fetch: default_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_jitter_ms: default_retry_jitter_ms(),
            escalate_to_alt: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Politeness delays between pages and categories
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PacingConfig {
    #[serde(default = "default_page_delay_min_ms")]
    pub page_delay_min_ms: u64,

    #[serde(default = "default_page_delay_max_ms")]
    pub page_delay_max_ms: u64,

    #[serde(default = "default_category_delay_min_ms")]
    pub category_delay_min_ms: u64,

    #[serde(default = "default_category_delay_max_ms")]
    pub category_delay_max_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_delay_min_ms: default_page_delay_min_ms(),
            page_delay_max_ms: default_page_delay_max_ms(),
            category_delay_min_ms: default_category_delay_min_ms(),
            category_delay_max_ms: default_category_delay_max_ms(),
        }
    }
}

/// Ordered selector lists (CSS syntax)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SelectorConfig {
    /// Queries locating listing containers on a category page
    #[serde(default = "default_listing_selectors")]
    pub listing: Vec<String>,

    /// Queries locating links to category pages on a listing root
    #[serde(default = "default_category_link_selectors")]
    pub category_link: Vec<String>,

    /// Per-field overrides; fields not named here keep their defaults
    #[serde(default)]
    pub fields: HashMap<Field, Vec<String>>,
}

impl SelectorConfig {
    /// Returns the effective query list for a field
    pub fn field_queries(&self, field: Field) -> Vec<String> {
        match self.fields.get(&field) {
            Some(queries) => queries.clone(),
            None => defaults::field_selectors(field)
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing: default_listing_selectors(),
            category_link: default_category_link_selectors(),
            fields: HashMap::new(),
        }
    }
}

/// Catalog profile: static values stamped onto every record
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProfileConfig {
    /// Fill an empty year with the current calendar year
    #[serde(default)]
    pub default_year_to_current: bool,

    /// Values for fields that extraction leaves empty (e.g., type = "New Car")
    #[serde(default)]
    pub defaults: BTreeMap<Field, String>,
}

/// One browser identity in the rotation pool
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IdentityConfig {
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the JSON records file
    #[serde(default)]
    pub json_path: Option<String>,

    /// Path of the SQLite database file
    #[serde(default)]
    pub database_path: Option<String>,

    /// Path of the markdown run summary
    #[serde(default)]
    pub summary_path: Option<String>,
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_api_endpoints() -> Vec<String> {
    to_strings(defaults::API_ENDPOINTS)
}

fn default_listing_roots() -> Vec<String> {
    to_strings(defaults::LISTING_ROOTS)
}

fn default_seed_template() -> String {
    defaults::SEED_TEMPLATE.to_string()
}

fn default_fallback_categories() -> Vec<String> {
    to_strings(defaults::FALLBACK_CATEGORIES)
}

fn default_listing_selectors() -> Vec<String> {
    to_strings(defaults::LISTING_SELECTORS)
}

fn default_category_link_selectors() -> Vec<String> {
    to_strings(defaults::CATEGORY_LINK_SELECTORS)
}

fn default_identities() -> Vec<IdentityConfig> {
    defaults::USER_AGENTS
        .iter()
        .map(|ua| IdentityConfig {
            user_agent: ua.to_string(),
            accept_language: default_accept_language(),
        })
        .collect()
}

fn default_accept_language() -> String {
    defaults::ACCEPT_LANGUAGE.to_string()
}

fn default_max_pages() -> u32 {
    20
}

fn default_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_retry_jitter_ms() -> u64 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_delay_min_ms() -> u64 {
    3000
}

fn default_page_delay_max_ms() -> u64 {
    7000
}

fn default_category_delay_min_ms() -> u64 {
    8000
}

fn default_category_delay_max_ms() -> u64 {
    15000
}
