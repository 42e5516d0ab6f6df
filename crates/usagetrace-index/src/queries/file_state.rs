use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::records::FileStateRecord;
use crate::{Error, Result};

pub fn upsert(conn: &Connection, state: &FileStateRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO file_states (source, file_path, fingerprint, last_imported, record_count)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(source, file_path) DO UPDATE SET
            fingerprint = ?3,
            last_imported = ?4,
            record_count = ?5
        "#,
        params![
            &state.source,
            &state.file_path,
            &state.fingerprint,
            state.last_imported.to_rfc3339(),
            state.record_count
        ],
    )?;

    Ok(())
}

pub fn get(conn: &Connection, source: &str, file_path: &str) -> Result<Option<FileStateRecord>> {
    let row = conn
        .query_row(
            r#"
            SELECT source, file_path, fingerprint, last_imported, record_count
            FROM file_states
            WHERE source = ?1 AND file_path = ?2
            "#,
            params![source, file_path],
            read_row,
        )
        .optional()?;

    row.map(into_record).transpose()
}

pub fn list(conn: &Connection, source: Option<&str>) -> Result<Vec<FileStateRecord>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT source, file_path, fingerprint, last_imported, record_count
        FROM file_states
        WHERE ?1 IS NULL OR source = ?1
        ORDER BY source, file_path
        "#,
    )?;

    let rows = stmt
        .query_map(params![source], read_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(into_record).collect()
}

pub fn delete_source(conn: &Connection, source: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM file_states WHERE source = ?1", [source])?)
}

type RawRow = (String, String, String, String, i64);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn into_record((source, file_path, fingerprint, last_imported, record_count): RawRow) -> Result<FileStateRecord> {
    let last_imported = DateTime::parse_from_rfc3339(&last_imported)
        .map_err(|e| Error::Query(format!("bad last_imported '{}': {}", last_imported, e)))?
        .with_timezone(&Utc);

    Ok(FileStateRecord {
        source,
        file_path,
        fingerprint,
        last_imported,
        record_count,
    })
}
