//! Content extraction for Catalog Trawler
//!
//! This module turns fetched bodies into domain values:
//! - the selector cascade used for every markup lookup
//! - the structured-data probe used during category discovery
//! - the record extractor that builds one record per listing fragment

mod cascade;
mod probe;
mod record;

use thiserror::Error;

pub use cascade::{
    cascade, element_text, first_match, first_text, first_value, CascadeMatch, QuerySpec,
    Scope,
};
pub use probe::{CategoryEntry, StructuredDataProbe};
pub use record::{find_year, RecordExtractor};

/// Why a listing fragment did not become a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("record brand is empty")]
    MissingBrand,

    #[error("listing fragment yielded no fields")]
    Empty,
}
