//! Database schema for the SQLite sink
//!
//! The `records` table has one column per record field, named after the
//! field key. Core columns are NOT NULL (empty when not located); optional
//! columns are NULL when the record does not carry the field.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    record_count INTEGER
);

-- Extracted records, in extraction order per run
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    brand TEXT NOT NULL,
    model TEXT NOT NULL,
    year TEXT NOT NULL,
    price TEXT NOT NULL,
    mileage TEXT NOT NULL,
    fuel_type TEXT NOT NULL,
    transmission TEXT NOT NULL,
    engine_size TEXT NOT NULL,
    color TEXT NOT NULL,
    url TEXT NOT NULL,
    description TEXT NOT NULL,
    type TEXT,
    warranty TEXT,
    features TEXT,
    safety_features TEXT,
    tech_features TEXT,
    comfort_features TEXT,
    dealer_location TEXT,
    availability TEXT,
    delivery_time TEXT,
    UNIQUE(run_id, position)
);

CREATE INDEX IF NOT EXISTS idx_records_run ON records(run_id);
CREATE INDEX IF NOT EXISTS idx_records_brand ON records(brand);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
