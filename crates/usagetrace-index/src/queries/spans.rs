use rusqlite::{Connection, params};
use usagetrace_types::{Span, unix_nanos};

use super::{enum_name, to_json};
use crate::Result;

pub const TABLE: &str = "spans";
pub const ATTRIBUTES: &str = "span_attributes";

pub fn insert_batch(conn: &Connection, spans: &[Span]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        r#"
        INSERT INTO spans (timestamp, trace_id, span_id, parent_span_id, trace_state,
                           span_name, span_kind, service_name, duration_ns, status_code,
                           status_message, resource_attributes, span_attributes, events, links)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
    )?;

    for span in spans {
        stmt.execute(params![
            unix_nanos(&span.timestamp),
            &span.trace_id,
            &span.span_id,
            &span.parent_span_id,
            &span.trace_state,
            &span.span_name,
            enum_name(&span.span_kind)?,
            &span.service_name,
            span.duration_ns,
            enum_name(&span.status_code)?,
            &span.status_message,
            to_json(&span.resource_attributes)?,
            to_json(&span.span_attributes)?,
            to_json(&span.events)?,
            to_json(&span.links)?,
        ])?;
    }

    Ok(spans.len())
}
