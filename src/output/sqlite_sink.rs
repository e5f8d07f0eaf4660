//! SQLite record output
//!
//! Every run gets a row in `runs` (with the configuration hash) and its
//! records go to `records` in a single transaction.

use crate::output::schema::initialize_schema;
use crate::output::traits::{RecordSink, SinkResult};
use crate::state::{Field, Record};
use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::path::{Path, PathBuf};

const STATUS_RUNNING: &str = "running";
const STATUS_COMPLETED: &str = "completed";
const STATUS_CANCELLED: &str = "cancelled";

/// SQLite sink
pub struct SqliteSink {
    conn: Connection,
    run_id: i64,
    path: PathBuf,
    final_status: &'static str,
}

impl SqliteSink {
    /// Opens (or creates) the database and registers a new run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Hash of the configuration used for this run
    pub fn open(path: &Path, config_hash: &str) -> SinkResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Self::with_connection(conn, config_hash, path.to_path_buf())
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory(config_hash: &str) -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, config_hash, PathBuf::from(":memory:"))
    }

    fn with_connection(conn: Connection, config_hash: &str, path: PathBuf) -> SinkResult<Self> {
        initialize_schema(&conn)?;

        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![Utc::now().to_rfc3339(), config_hash, STATUS_RUNNING],
        )?;
        let run_id = conn.last_insert_rowid();

        Ok(Self {
            conn,
            run_id,
            path,
            final_status: STATUS_COMPLETED,
        })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl RecordSink for SqliteSink {
    fn write(&mut self, records: &[Record]) -> SinkResult<()> {
        let columns: Vec<&str> = Field::all().iter().map(|f| f.as_str()).collect();
        let placeholders: Vec<String> = (1..=columns.len() + 2).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO records (run_id, position, {}) VALUES ({})",
            columns
                .iter()
                .map(|c| format!("\"{}\"", c))
                .collect::<Vec<_>>()
                .join(", "),
            placeholders.join(", ")
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for (position, record) in records.iter().enumerate() {
                let mut values = vec![Value::Integer(self.run_id), Value::Integer(position as i64)];
                values.extend(Field::all().into_iter().map(|field| {
                    if record.has(field) {
                        Value::Text(record.get(field).to_string())
                    } else {
                        Value::Null
                    }
                }));
                stmt.execute(params_from_iter(values))?;
            }
        }

        tx.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, record_count = ?3 WHERE id = ?4",
            params![
                self.final_status,
                Utc::now().to_rfc3339(),
                records.len() as i64,
                self.run_id
            ],
        )?;
        tx.commit()?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("SQLite database {} (run {})", self.path.display(), self.run_id)
    }

    fn mark_cancelled(&mut self) {
        self.final_status = STATUS_CANCELLED;
    }
}
