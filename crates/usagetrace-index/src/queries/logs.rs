use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use usagetrace_types::{LogRecord, from_unix_nanos, unix_nanos};

use super::{from_json, scope_clause, to_json};
use crate::{Result, TelemetryFilter};

pub const TABLE: &str = "logs";
pub const ATTRIBUTES: &str = "log_attributes";

pub fn insert_batch(conn: &Connection, logs: &[LogRecord]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        r#"
        INSERT INTO logs (timestamp, trace_id, span_id, severity_text, severity_number,
                          service_name, body, resource_attributes, scope_name,
                          scope_attributes, log_attributes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )?;

    for log in logs {
        stmt.execute(params![
            unix_nanos(&log.timestamp),
            &log.trace_id,
            &log.span_id,
            &log.severity_text,
            log.severity_number,
            &log.service_name,
            &log.body,
            to_json(&log.resource_attributes)?,
            &log.scope_name,
            to_json(&log.scope_attributes)?,
            to_json(&log.log_attributes)?,
        ])?;
    }

    Ok(logs.len())
}

struct LogRow {
    timestamp: i64,
    trace_id: Option<String>,
    span_id: Option<String>,
    severity_text: String,
    severity_number: i32,
    service_name: String,
    body: String,
    resource_attributes: String,
    scope_name: String,
    scope_attributes: String,
    log_attributes: String,
}

/// Logs in scope, oldest first. `limit` of `None` returns every match.
pub fn query(conn: &Connection, filter: &TelemetryFilter, limit: Option<usize>) -> Result<Vec<LogRecord>> {
    let (clause, mut values) = scope_clause(filter);
    let sql = format!(
        r#"
        SELECT timestamp, trace_id, span_id, severity_text, severity_number, service_name,
               body, resource_attributes, scope_name, scope_attributes, log_attributes
        FROM logs
        WHERE {}
        ORDER BY timestamp, id
        LIMIT ?
        "#,
        clause
    );
    values.push(Value::Integer(limit.map_or(-1, |l| l as i64)));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), |row| {
            Ok(LogRow {
                timestamp: row.get(0)?,
                trace_id: row.get(1)?,
                span_id: row.get(2)?,
                severity_text: row.get(3)?,
                severity_number: row.get(4)?,
                service_name: row.get(5)?,
                body: row.get(6)?,
                resource_attributes: row.get(7)?,
                scope_name: row.get(8)?,
                scope_attributes: row.get(9)?,
                log_attributes: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|row| -> Result<LogRecord> {
            Ok(LogRecord {
                timestamp: from_unix_nanos(row.timestamp),
                trace_id: row.trace_id,
                span_id: row.span_id,
                severity_text: row.severity_text,
                severity_number: row.severity_number,
                service_name: row.service_name,
                body: row.body,
                resource_attributes: from_json(&row.resource_attributes)?,
                scope_name: row.scope_name,
                scope_attributes: from_json(&row.scope_attributes)?,
                log_attributes: from_json(&row.log_attributes)?,
            })
        })
        .collect()
}
