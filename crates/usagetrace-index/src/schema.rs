use rusqlite::Connection;

use crate::Result;

// Schema version (increment when changing table definitions)
pub const SCHEMA_VERSION: i32 = 1;

// Timestamps are unix nanoseconds so range filters are integer comparisons.
// Attribute maps, buckets, events and links are JSON text.
pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version != SCHEMA_VERSION {
        drop_all_tables(conn)?;
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS file_states (
            source TEXT NOT NULL,
            file_path TEXT NOT NULL,
            fingerprint TEXT NOT NULL,
            last_imported TEXT NOT NULL,
            record_count INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (source, file_path)
        );

        CREATE TABLE IF NOT EXISTS logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER NOT NULL,
            trace_id TEXT,
            span_id TEXT,
            severity_text TEXT NOT NULL,
            severity_number INTEGER NOT NULL,
            service_name TEXT NOT NULL,
            body TEXT NOT NULL,
            resource_attributes TEXT NOT NULL,
            scope_name TEXT NOT NULL,
            scope_attributes TEXT NOT NULL,
            log_attributes TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER NOT NULL,
            service_name TEXT NOT NULL,
            metric_name TEXT NOT NULL,
            metric_description TEXT NOT NULL,
            metric_unit TEXT NOT NULL,
            metric_type TEXT NOT NULL,
            value REAL,
            count INTEGER,
            sum REAL,
            min REAL,
            max REAL,
            bucket_counts TEXT,
            explicit_bounds TEXT,
            scale INTEGER,
            zero_count INTEGER,
            positive TEXT,
            negative TEXT,
            quantiles TEXT,
            is_monotonic INTEGER,
            aggregation_temporality TEXT,
            attributes TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS spans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER NOT NULL,
            trace_id TEXT NOT NULL,
            span_id TEXT NOT NULL,
            parent_span_id TEXT,
            trace_state TEXT,
            span_name TEXT NOT NULL,
            span_kind TEXT NOT NULL,
            service_name TEXT NOT NULL,
            duration_ns INTEGER NOT NULL,
            status_code TEXT NOT NULL,
            status_message TEXT NOT NULL,
            resource_attributes TEXT NOT NULL,
            span_attributes TEXT NOT NULL,
            events TEXT NOT NULL,
            links TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_file_states_source ON file_states(source);
        CREATE INDEX IF NOT EXISTS idx_logs_ts ON logs(timestamp, service_name);
        CREATE INDEX IF NOT EXISTS idx_metrics_ts ON metrics(timestamp, service_name);
        CREATE INDEX IF NOT EXISTS idx_spans_ts ON spans(timestamp, service_name);
        "#,
    )?;

    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;

    Ok(())
}

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS spans;
        DROP TABLE IF EXISTS metrics;
        DROP TABLE IF EXISTS logs;
        DROP TABLE IF EXISTS file_states;
        "#,
    )?;
    Ok(())
}
