//! Category discovery
//!
//! Finds the categories to crawl. Three strategies run in order and the
//! first one that yields anything wins:
//!
//! 1. API probe: structured-data endpoints returning a category array
//! 2. HTML probe: category links on listing-root pages
//! 3. Static fallback: the configured slug table
//!
//! The result is never empty as long as the fallback table is not.

use crate::config::Config;
use crate::crawler::fetcher::ResilientFetcher;
use crate::crawler::transport::FetchResult;
use crate::extract::{element_text, first_match, CategoryEntry, QuerySpec, StructuredDataProbe};
use crate::state::Category;
use crate::url::{expand_seed_template, is_http, name_to_slug, resolve_link, slug_to_name};
use crate::ConfigError;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

pub struct CategoryDiscoverer {
    base_url: Url,
    api_endpoints: Vec<String>,
    listing_roots: Vec<String>,
    seed_template: String,
    fallback: Vec<String>,
    link_queries: Vec<QuerySpec>,
}

impl CategoryDiscoverer {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.site.base_url, e)))?;

        Ok(Self {
            base_url,
            api_endpoints: config.site.api_endpoints.clone(),
            listing_roots: config.site.listing_roots.clone(),
            seed_template: config.site.seed_template.clone(),
            fallback: config.site.fallback_categories.clone(),
            link_queries: QuerySpec::parse_all(&config.selectors.category_link)?,
        })
    }

    /// Discovers the categories of the site
    ///
    /// Probing is skipped when the run is already cancelled; the fallback
    /// table is returned in that case.
    pub async fn discover(&self, fetcher: &mut ResilientFetcher) -> Vec<Category> {
        if !fetcher.is_cancelled() {
            let categories = self.probe_api(fetcher).await;
            if !categories.is_empty() {
                tracing::info!("Discovered {} categories from the API", categories.len());
                return categories;
            }
        }

        if !fetcher.is_cancelled() {
            let categories = self.probe_html(fetcher).await;
            if !categories.is_empty() {
                tracing::info!("Discovered {} categories from listing pages", categories.len());
                return categories;
            }
        }

        let categories = self.fallback();
        tracing::warn!(
            "No categories discovered, using {} fallback categories",
            categories.len()
        );
        categories
    }

    /// Tries each structured-data endpoint in order
    async fn probe_api(&self, fetcher: &mut ResilientFetcher) -> Vec<Category> {
        for endpoint in &self.api_endpoints {
            let Ok(url) = self.base_url.join(endpoint) else {
                continue;
            };

            tracing::debug!("Probing API endpoint {}", url);
            let body = match fetcher.fetch_resilient(&url).await {
                FetchResult::Success { body, .. } => body,
                FetchResult::Failure { kind, .. } => {
                    tracing::debug!("API endpoint {} unusable: {}", url, kind);
                    if fetcher.is_cancelled() {
                        return Vec::new();
                    }
                    continue;
                }
            };

            let Some(value) = StructuredDataProbe::decode(&body) else {
                tracing::debug!("API endpoint {} did not return JSON", url);
                continue;
            };

            let categories = dedupe(
                StructuredDataProbe::entries(&value)
                    .iter()
                    .filter_map(|entry| self.category_from_entry(entry))
                    .collect(),
            );
            if !categories.is_empty() {
                return categories;
            }
        }
        Vec::new()
    }

    /// Tries each listing-root page in order
    async fn probe_html(&self, fetcher: &mut ResilientFetcher) -> Vec<Category> {
        for root in &self.listing_roots {
            let Ok(url) = self.base_url.join(root) else {
                continue;
            };

            tracing::debug!("Scanning {} for category links", url);
            let (body, final_url) = match fetcher.fetch_resilient(&url).await {
                FetchResult::Success {
                    body, final_url, ..
                } => (body, final_url),
                FetchResult::Failure { kind, .. } => {
                    tracing::debug!("Listing root {} unusable: {}", url, kind);
                    if fetcher.is_cancelled() {
                        return Vec::new();
                    }
                    continue;
                }
            };

            let categories = category_links(&body, &final_url, &self.link_queries);
            if !categories.is_empty() {
                return categories;
            }
        }
        Vec::new()
    }

    /// Builds the categories of the static fallback table
    pub fn fallback(&self) -> Vec<Category> {
        let categories = self
            .fallback
            .iter()
            .filter_map(|slug| {
                let seed = expand_seed_template(&self.seed_template, &self.base_url, slug)
                    .map_err(|e| tracing::warn!("Skipping fallback category {}: {}", slug, e))
                    .ok()?;
                Some(Category::new(slug_to_name(slug), seed))
            })
            .collect();
        dedupe(categories)
    }

    fn category_from_entry(&self, entry: &CategoryEntry) -> Option<Category> {
        let seed = match entry.locator.as_deref() {
            Some(locator) if locator.starts_with("http://") || locator.starts_with("https://") => {
                Url::parse(locator).ok()
            }
            Some(locator) if locator.starts_with('/') => self.base_url.join(locator).ok(),
            Some(slug) => expand_seed_template(&self.seed_template, &self.base_url, slug).ok(),
            None => expand_seed_template(
                &self.seed_template,
                &self.base_url,
                &name_to_slug(&entry.name),
            )
            .ok(),
        }?;

        if !is_http(&seed) {
            return None;
        }
        Some(Category::new(entry.name.clone(), seed))
    }
}

/// Extracts category links from a listing-root page
fn category_links(body: &[u8], page_url: &Url, queries: &[QuerySpec]) -> Vec<Category> {
    let document = Html::parse_document(&String::from_utf8_lossy(body));
    let Some(matched) = first_match(&&document, queries) else {
        return Vec::new();
    };

    tracing::debug!(
        "Category links matched by '{}': {}",
        matched.query.as_str(),
        matched.items.len()
    );

    let categories = matched
        .items
        .iter()
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            let name = element_text(*link);
            if name.chars().count() <= 1 {
                return None;
            }
            let seed = resolve_link(href, page_url)?;
            Some(Category::new(name, seed))
        })
        .collect();

    dedupe(categories)
}

/// Drops categories whose seed URL was already seen, keeping the first
fn dedupe(categories: Vec<Category>) -> Vec<Category> {
    let mut seen = HashSet::new();
    categories
        .into_iter()
        .filter(|category| seen.insert(category.seed_url.clone()))
        .collect()
}
