//! Record sink trait and errors
//!
//! A sink receives the full record sequence exactly once, at the end of a
//! run. Sink failures are the only errors that abort a run after it started.

use crate::state::Record;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Errors that can occur while writing records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for extracted records
pub trait RecordSink {
    /// Writes the complete, ordered record sequence
    fn write(&mut self, records: &[Record]) -> SinkResult<()>;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;

    /// Called before `write` when the run was cut short by cancellation
    fn mark_cancelled(&mut self) {}
}

/// Sink that keeps records in memory
///
/// Clones share the same buffer, so a caller can keep a handle while the
/// crawler owns the boxed sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemoryBuffer>>,
}

#[derive(Debug, Default)]
struct MemoryBuffer {
    records: Vec<Record>,
    writes: usize,
}

impl MemorySink {
    // The buffer is plain data, so a poisoned lock is still usable
    fn buffer(&self) -> MutexGuard<'_, MemoryBuffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records from the most recent write
    pub fn records(&self) -> Vec<Record> {
        self.buffer().records.clone()
    }

    /// Number of writes received
    pub fn writes(&self) -> usize {
        self.buffer().writes
    }
}

impl RecordSink for MemorySink {
    fn write(&mut self, records: &[Record]) -> SinkResult<()> {
        let mut buffer = self.buffer();
        buffer.records = records.to_vec();
        buffer.writes += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
