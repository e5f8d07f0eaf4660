//! Output module for delivering records and run summaries
//!
//! This module handles:
//! - Writing records to the configured sinks (JSON, SQLite)
//! - Generating markdown summaries of a run
//! - Computing and printing run statistics

mod json_sink;
mod markdown;
mod schema;
mod sqlite_sink;
pub mod stats;
mod traits;

pub use json_sink::JsonSink;
pub use markdown::{format_markdown_summary, write_summary};
pub use sqlite_sink::SqliteSink;
pub use stats::{print_statistics, RunStatistics};
pub use traits::{MemorySink, RecordSink, SinkError, SinkResult};

use crate::config::OutputConfig;
use std::path::Path;

/// Opens every sink named in the output configuration
///
/// The database is opened (and the run registered) up front, so an
/// unwritable database fails the run before any network traffic.
///
/// # Arguments
///
/// * `config` - The output configuration
/// * `config_hash` - Hash of the configuration file, stored with the run
///
/// # Returns
///
/// * `Ok(Vec<Box<dyn RecordSink>>)` - One sink per configured output
/// * `Err(SinkError)` - A sink could not be opened
pub fn open_sinks(config: &OutputConfig, config_hash: &str) -> SinkResult<Vec<Box<dyn RecordSink>>> {
    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();

    if let Some(path) = &config.json_path {
        sinks.push(Box::new(JsonSink::new(Path::new(path))));
    }

    if let Some(path) = &config.database_path {
        sinks.push(Box::new(SqliteSink::open(Path::new(path), config_hash)?));
    }

    Ok(sinks)
}
