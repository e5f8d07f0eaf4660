//! Category definitions and the terminal states of a category crawl

use std::fmt;
use url::Url;

/// A catalog category (one brand or product line) and where its listings start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Display name; becomes the brand of every record from this category
    pub name: String,

    /// Absolute URL of the first listing page
    pub seed_url: Url,
}

impl Category {
    pub fn new(name: impl Into<String>, seed_url: Url) -> Self {
        Self {
            name: name.into(),
            seed_url,
        }
    }
}

/// Why the crawl of a category stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryStop {
    // ===== Normal Termination =====
    /// A page produced no listings, or no listing produced a record
    NoRecords,

    /// The per-category page cap was reached
    PageCap,

    // ===== Early Termination =====
    /// A page could not be fetched even after retries and escalation
    FetchFailed,

    /// The run was cancelled while this category was in progress
    Cancelled,
}

impl CategoryStop {
    /// Returns true if the category ended because the data ran out or the cap hit
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::NoRecords | Self::PageCap)
    }

    /// Returns true if the category ended early
    pub fn is_early(&self) -> bool {
        !self.is_complete()
    }

    /// Converts the stop reason to its database/report string
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::NoRecords => "no_records",
            Self::PageCap => "page_cap",
            Self::FetchFailed => "fetch_failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns all stop reasons
    pub fn all() -> Vec<Self> {
        vec![
            Self::NoRecords,
            Self::PageCap,
            Self::FetchFailed,
            Self::Cancelled,
        ]
    }
}

impl fmt::Display for CategoryStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
