use crate::config::types::{
    Config, CrawlerConfig, FetcherConfig, IdentityConfig, OutputConfig, PacingConfig,
    ProfileConfig, SelectorConfig, SiteConfig,
};
use crate::extract::QuerySpec;
use crate::state::Field;
use crate::url::{expand_seed_template, is_http};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_pacing_config(&config.pacing)?;
    validate_selector_config(&config.selectors)?;
    validate_profile_config(&config.profile)?;
    validate_identities(&config.identities)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site description
fn validate_site_config(site: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&site.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", site.base_url, e)))?;

    if !is_http(&base) {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            site.base_url
        )));
    }

    if site.fallback_categories.is_empty() {
        return Err(ConfigError::Validation(
            "fallback-categories must contain at least one category".to_string(),
        ));
    }

    // Every fallback slug must expand into a valid seed URL
    for slug in &site.fallback_categories {
        if slug.trim().is_empty() {
            return Err(ConfigError::Validation(
                "fallback-categories cannot contain empty entries".to_string(),
            ));
        }

        expand_seed_template(&site.seed_template, &base, slug).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed for fallback '{}': {}", slug, e))
        })?;
    }

    for endpoint in site.api_endpoints.iter().chain(site.listing_roots.iter()) {
        base.join(endpoint)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid probe path '{}': {}", endpoint, e)))?;
    }

    Ok(())
}

/// Validates crawl loop limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_brands == Some(0) {
        return Err(ConfigError::Validation(
            "max-brands must be >= 1 when set".to_string(),
        ));
    }

    if config.run_budget_secs == Some(0) {
        return Err(ConfigError::Validation(
            "run-budget-secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the retry policy
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.attempts_per_fetch < 1 {
        return Err(ConfigError::Validation(format!(
            "attempts-per-fetch must be >= 1, got {}",
            config.attempts_per_fetch
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates the pacing ranges
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    validate_range(
        "page-delay",
        config.page_delay_min_ms,
        config.page_delay_max_ms,
    )?;
    validate_range(
        "category-delay",
        config.category_delay_min_ms,
        config.category_delay_max_ms,
    )?;
    Ok(())
}

fn validate_range(name: &str, min: u64, max: u64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::Validation(format!(
            "{}-min-ms ({}) must not exceed {}-max-ms ({})",
            name, min, name, max
        )));
    }
    Ok(())
}

/// Validates that every selector compiles and the essential lists are non-empty
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    if config.listing.is_empty() {
        return Err(ConfigError::Validation(
            "selectors.listing must contain at least one selector".to_string(),
        ));
    }

    if config.fields.contains_key(&Field::Brand) {
        return Err(ConfigError::Validation(
            "the brand field comes from the category and cannot have selectors".to_string(),
        ));
    }

    QuerySpec::parse_all(&config.listing)?;
    QuerySpec::parse_all(&config.category_link)?;
    for field in Field::all() {
        QuerySpec::parse_all(&config.field_queries(field))?;
    }

    Ok(())
}

/// Validates the catalog profile
fn validate_profile_config(config: &ProfileConfig) -> Result<(), ConfigError> {
    if config.defaults.contains_key(&Field::Brand) {
        return Err(ConfigError::Validation(
            "the brand field comes from the category and cannot have a default".to_string(),
        ));
    }
    Ok(())
}

/// Validates the identity pool
fn validate_identities(identities: &[IdentityConfig]) -> Result<(), ConfigError> {
    if identities.is_empty() {
        return Err(ConfigError::Validation(
            "at least one identity is required".to_string(),
        ));
    }

    for identity in identities {
        if identity.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "identity user-agent cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let paths = [&config.json_path, &config.database_path, &config.summary_path];
    if paths.iter().any(|p| matches!(p, Some(path) if path.is_empty())) {
        return Err(ConfigError::Validation(
            "output paths cannot be empty strings".to_string(),
        ));
    }

    if config.json_path.is_none() && config.database_path.is_none() {
        return Err(ConfigError::Validation(
            "at least one of output.json-path or output.database-path is required".to_string(),
        ));
    }

    Ok(())
}
