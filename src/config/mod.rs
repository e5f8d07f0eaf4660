//! Configuration module for Catalog Trawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Everything except the site base URL and one output path has a default, so a
//! minimal file names the site and where the records go.
//!
//! # Example
//!
//! ```no_run
//! use catalog_trawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawler.toml")).unwrap();
//! println!("Crawling {} with up to {} pages per category",
//!     config.site.display_name(), config.crawler.max_pages);
//! ```

pub mod defaults;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetcherConfig, IdentityConfig, OutputConfig, PacingConfig,
    ProfileConfig, SelectorConfig, SiteConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_content, load_config, load_config_with_hash, parse_config,
};
