pub mod file_state;
pub mod logs;
pub mod metrics;
pub mod spans;

use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Result, SessionKey, TelemetryFilter};

/// `WHERE` body and bound values for a telemetry scope
fn scope_clause(filter: &TelemetryFilter) -> (String, Vec<Value>) {
    let mut clause = String::from("timestamp >= ? AND timestamp <= ?");
    let mut values = vec![
        Value::Integer(filter.from_nanos),
        Value::Integer(filter.to_nanos),
    ];

    if !filter.services.is_empty() {
        let placeholders = vec!["?"; filter.services.len()].join(", ");
        clause.push_str(&format!(" AND service_name IN ({})", placeholders));
        values.extend(filter.services.iter().cloned().map(Value::Text));
    }

    (clause, values)
}

pub(crate) fn count_in(conn: &Connection, table: &str, filter: &TelemetryFilter) -> Result<usize> {
    let (clause, values) = scope_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", table, clause);
    let count: i64 = conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
    Ok(count as usize)
}

pub(crate) fn delete_in(conn: &Connection, table: &str, filter: &TelemetryFilter) -> Result<usize> {
    let (clause, values) = scope_clause(filter);
    let sql = format!("DELETE FROM {} WHERE {}", table, clause);
    Ok(conn.execute(&sql, params_from_iter(values.iter()))?)
}

/// Delete the rows of one session; `attributes` names the table's attribute column
pub(crate) fn delete_session(conn: &Connection, table: &str, attributes: &str, key: &SessionKey) -> Result<usize> {
    let sql = format!(
        "DELETE FROM {} WHERE service_name = ?1 AND json_extract({}, '$.\"session.id\"') = ?2",
        table, attributes
    );
    Ok(conn.execute(&sql, params![&key.service, &key.session_id])?)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn from_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    Ok(serde_json::from_str(text)?)
}

fn opt_json<T: Serialize>(value: &[T]) -> Result<Option<String>> {
    if value.is_empty() {
        Ok(None)
    } else {
        to_json(value).map(Some)
    }
}

/// Snake-case name of a unit enum, as serde writes it
fn enum_name<T: Serialize>(value: &T) -> Result<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(name) => Ok(name),
        other => Ok(other.to_string()),
    }
}
