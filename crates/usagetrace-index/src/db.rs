use rusqlite::Connection;
use std::path::Path;
use tracing::debug;
use usagetrace_types::{LogRecord, MetricDataPoint, Span};

use crate::queries::{self, file_state, logs, metrics, spans};
use crate::records::{FileStateRecord, SessionKey, TelemetryCounts, TelemetryFilter};
use crate::{Result, schema};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        schema::init_schema(&conn)?;
        debug!(path = %db_path.display(), "opened database");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    // File state operations

    pub fn upsert_file_state(&self, state: &FileStateRecord) -> Result<()> {
        file_state::upsert(&self.conn, state)
    }

    pub fn get_file_state(&self, source: &str, file_path: &str) -> Result<Option<FileStateRecord>> {
        file_state::get(&self.conn, source, file_path)
    }

    /// All file states, or only those of `source`, ordered by source then path
    pub fn list_file_states(&self, source: Option<&str>) -> Result<Vec<FileStateRecord>> {
        file_state::list(&self.conn, source)
    }

    pub fn delete_file_states(&self, source: &str) -> Result<usize> {
        file_state::delete_source(&self.conn, source)
    }

    // Telemetry operations

    pub fn insert_logs(&self, records: &[LogRecord]) -> Result<usize> {
        logs::insert_batch(&self.conn, records)
    }

    pub fn insert_metrics(&self, records: &[MetricDataPoint]) -> Result<usize> {
        metrics::insert_batch(&self.conn, records)
    }

    pub fn insert_spans(&self, records: &[Span]) -> Result<usize> {
        spans::insert_batch(&self.conn, records)
    }

    pub fn count_logs(&self, filter: &TelemetryFilter) -> Result<usize> {
        queries::count_in(&self.conn, logs::TABLE, filter)
    }

    pub fn count_metrics(&self, filter: &TelemetryFilter) -> Result<usize> {
        queries::count_in(&self.conn, metrics::TABLE, filter)
    }

    pub fn count_spans(&self, filter: &TelemetryFilter) -> Result<usize> {
        queries::count_in(&self.conn, spans::TABLE, filter)
    }

    pub fn count_all(&self, filter: &TelemetryFilter) -> Result<TelemetryCounts> {
        Ok(TelemetryCounts {
            logs: self.count_logs(filter)?,
            metrics: self.count_metrics(filter)?,
            spans: self.count_spans(filter)?,
        })
    }

    pub fn delete_logs(&self, filter: &TelemetryFilter) -> Result<usize> {
        queries::delete_in(&self.conn, logs::TABLE, filter)
    }

    pub fn delete_metrics(&self, filter: &TelemetryFilter) -> Result<usize> {
        queries::delete_in(&self.conn, metrics::TABLE, filter)
    }

    pub fn delete_spans(&self, filter: &TelemetryFilter) -> Result<usize> {
        queries::delete_in(&self.conn, spans::TABLE, filter)
    }

    /// Delete all three kinds in one transaction
    pub fn delete_all(&self, filter: &TelemetryFilter) -> Result<TelemetryCounts> {
        let tx = self.conn.unchecked_transaction()?;
        let counts = delete_scope(&tx, filter)?;
        tx.commit()?;
        Ok(counts)
    }

    pub fn query_logs(&self, filter: &TelemetryFilter, limit: Option<usize>) -> Result<Vec<LogRecord>> {
        logs::query(&self.conn, filter, limit)
    }

    /// Optionally purge `scope`, drop the stored rows of `sessions`, then insert
    /// the batch, atomically.
    ///
    /// Readers see either the old rows or the new ones, never the gap between
    /// the delete and the insert. Returns what the purge removed; rows replaced
    /// because their session was re-read are not counted.
    pub fn replace_telemetry(
        &self,
        scope: Option<&TelemetryFilter>,
        sessions: &[SessionKey],
        log_records: &[LogRecord],
        metric_points: &[MetricDataPoint],
        span_records: &[Span],
    ) -> Result<TelemetryCounts> {
        let tx = self.conn.unchecked_transaction()?;

        let purged = match scope {
            Some(filter) => delete_scope(&tx, filter)?,
            None => TelemetryCounts::default(),
        };

        let mut superseded = TelemetryCounts::default();
        for key in sessions {
            superseded = superseded + delete_session(&tx, key)?;
        }

        logs::insert_batch(&tx, log_records)?;
        metrics::insert_batch(&tx, metric_points)?;
        spans::insert_batch(&tx, span_records)?;

        tx.commit()?;

        debug!(
            purged = purged.total(),
            superseded = superseded.total(),
            logs = log_records.len(),
            metrics = metric_points.len(),
            spans = span_records.len(),
            "replaced telemetry"
        );
        Ok(purged)
    }
}

fn delete_scope(conn: &Connection, filter: &TelemetryFilter) -> Result<TelemetryCounts> {
    Ok(TelemetryCounts {
        logs: queries::delete_in(conn, logs::TABLE, filter)?,
        metrics: queries::delete_in(conn, metrics::TABLE, filter)?,
        spans: queries::delete_in(conn, spans::TABLE, filter)?,
    })
}

fn delete_session(conn: &Connection, key: &SessionKey) -> Result<TelemetryCounts> {
    Ok(TelemetryCounts {
        logs: queries::delete_session(conn, logs::TABLE, logs::ATTRIBUTES, key)?,
        metrics: queries::delete_session(conn, metrics::TABLE, metrics::ATTRIBUTES, key)?,
        spans: queries::delete_session(conn, spans::TABLE, spans::ATTRIBUTES, key)?,
    })
}
