use crate::config::{ProfileConfig, SelectorConfig};
use crate::extract::cascade::{first_text, first_value, QuerySpec};
use crate::extract::ExtractionError;
use crate::state::{Field, Record};
use crate::url::resolve_link;
use crate::ConfigError;
use chrono::Datelike;
use regex::Regex;
use scraper::ElementRef;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use url::Url;

/// Ordered queries for one extracted field
#[derive(Debug, Clone)]
struct FieldRule {
    field: Field,
    queries: Vec<QuerySpec>,
}

/// Builds records from listing fragments
///
/// Each field runs its own selector cascade inside the fragment. The brand is
/// never extracted: it is the name of the category being crawled. Fields the
/// page did not yield are filled from the year heuristics and the profile's
/// static defaults.
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    rules: Vec<FieldRule>,
    defaults: BTreeMap<Field, String>,
    default_year_to_current: bool,
}

impl RecordExtractor {
    /// Compiles the field query lists
    pub fn from_config(
        selectors: &SelectorConfig,
        profile: &ProfileConfig,
    ) -> Result<Self, ConfigError> {
        let mut rules = Vec::new();
        for field in Field::all() {
            if field == Field::Brand {
                continue;
            }
            let queries = QuerySpec::parse_all(&selectors.field_queries(field))?;
            if !queries.is_empty() {
                rules.push(FieldRule { field, queries });
            }
        }

        Ok(Self {
            rules,
            defaults: profile.defaults.clone(),
            default_year_to_current: profile.default_year_to_current,
        })
    }

    /// Extracts one record from a listing fragment
    ///
    /// Relative links are resolved against `page_url`. Fails with
    /// `MissingBrand` for a blank category name and with `Empty` when the
    /// fragment yields no field at all.
    pub fn extract(
        &self,
        fragment: ElementRef<'_>,
        category_name: &str,
        page_url: &Url,
    ) -> Result<Record, ExtractionError> {
        let mut record = Record::new(category_name)?;
        let mut located = 0usize;

        for rule in &self.rules {
            let value = match rule.field {
                Field::Url => extract_link(fragment, &rule.queries, page_url),
                _ => first_text(&fragment, &rule.queries),
            };

            if let Some(value) = value {
                located += 1;
                record = record.with(rule.field, value);
            }
        }

        if located == 0 {
            return Err(ExtractionError::Empty);
        }

        if record.get(Field::Year).is_empty() {
            if let Some(year) = find_year(record.get(Field::Model)) {
                record = record.with(Field::Year, year);
            } else if self.default_year_to_current {
                record = record.with(Field::Year, chrono::Utc::now().year().to_string());
            }
        }

        for (field, value) in &self.defaults {
            if record.get(*field).is_empty() {
                record = record.with(*field, value.clone());
            }
        }

        Ok(record)
    }
}

/// Returns the detail link of a fragment
///
/// A fragment that is itself an anchor uses its own href; otherwise the first
/// descendant link found by the cascade is used.
fn extract_link(fragment: ElementRef<'_>, queries: &[QuerySpec], page_url: &Url) -> Option<String> {
    let resolve = |el: ElementRef<'_>| {
        el.value()
            .attr("href")
            .and_then(|href| resolve_link(href, page_url))
            .map(|url| url.to_string())
    };

    if fragment.value().name() == "a" {
        if let Some(url) = resolve(fragment) {
            return Some(url);
        }
    }

    first_value(&fragment, queries, resolve)
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").expect("hardcoded regex pattern is valid"))
}

/// Finds a four-digit model year (1900-2099) in free text
pub fn find_year(text: &str) -> Option<String> {
    year_pattern().find(text).map(|m| m.as_str().to_string())
}
