//! URL handling module for Catalog Trawler
//!
//! This module provides link resolution, seed URL synthesis from templates,
//! slug/name conversion and listing page URL construction.

mod pagination;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use pagination::page_url;

/// Placeholder for the site base URL in seed templates
pub const BASE_PLACEHOLDER: &str = "{base}";

/// Placeholder for the category slug in seed templates
pub const SLUG_PLACEHOLDER: &str = "{slug}";

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if is_http(&absolute_url) => Some(absolute_url),
        _ => None,
    }
}

/// Expands a seed template such as `{base}/en/used-cars/{slug}`
///
/// A trailing slash on the base URL is dropped before substitution so that
/// `https://example.com/` and `https://example.com` give the same result.
///
/// # Examples
///
/// ```
/// use catalog_trawler::url::expand_seed_template;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// let seed = expand_seed_template("{base}/en/used-cars/{slug}", &base, "land-rover").unwrap();
/// assert_eq!(seed.as_str(), "https://example.com/en/used-cars/land-rover");
/// ```
pub fn expand_seed_template(template: &str, base_url: &Url, slug: &str) -> UrlResult<Url> {
    if !template.contains(SLUG_PLACEHOLDER) {
        return Err(UrlError::MissingSlug(template.to_string()));
    }

    let base = base_url.as_str().trim_end_matches('/');
    let expanded = template
        .replace(BASE_PLACEHOLDER, base)
        .replace(SLUG_PLACEHOLDER, slug.trim_matches('/'));

    let url = Url::parse(&expanded).map_err(|e| UrlError::Parse(format!("{}: {}", expanded, e)))?;
    if !is_http(&url) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    Ok(url)
}

/// Turns a slug like `mercedes-benz` into a display name like `Mercedes Benz`
pub fn slug_to_name(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turns a display name into a URL slug (`Land Rover` → `land-rover`)
pub fn name_to_slug(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Returns true for http and https URLs
pub fn is_http(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}
