//! State module for the crawl data model
//!
//! # Components
//!
//! - `Category`: A discovered category and its seed URL
//! - `CategoryStop`: Terminal reason of a category crawl
//! - `Record` / `Field`: One extracted listing and its named fields
//! - `CrawlState`: Append-only accumulator owned by the crawler
//! - `CrawlReport`: What a finished run hands to the sinks

mod category;
mod crawl_state;
mod record;

// Re-export main types
pub use category::{Category, CategoryStop};
pub use crawl_state::{CategoryProgress, CrawlReport, CrawlState};
pub use record::{Field, Record};
