//! Integration tests for schema migration
//!
//! Database::open drops and recreates tables whose version does not match.

use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;
use usagetrace_index::{Database, FileStateRecord, SCHEMA_VERSION, TelemetryFilter};

/// A file_states table from before record counts were tracked
fn create_stale_db(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE file_states (
            source TEXT NOT NULL,
            file_path TEXT NOT NULL,
            fingerprint TEXT NOT NULL,
            PRIMARY KEY (source, file_path)
        );
        INSERT INTO file_states VALUES ('codex', '/old/rollout.jsonl', 'deadbeef');
        PRAGMA user_version = 0;
        "#,
    )
    .unwrap();
}

#[test]
fn test_stale_schema_is_recreated() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("usagetrace.db");
    create_stale_db(&db_path);

    let db = Database::open(&db_path).unwrap();
    assert!(db.list_file_states(None).unwrap().is_empty());

    db.upsert_file_state(&FileStateRecord {
        source: "codex".to_string(),
        file_path: "/new/rollout.jsonl".to_string(),
        fingerprint: "cafe".to_string(),
        last_imported: Utc::now(),
        record_count: 4,
    })
    .unwrap();
    drop(db);

    let conn = Connection::open(&db_path).unwrap();
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);
}

#[test]
fn test_current_schema_keeps_data() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("usagetrace.db");

    {
        let db = Database::open(&db_path).unwrap();
        db.upsert_file_state(&FileStateRecord {
            source: "gemini".to_string(),
            file_path: "/g/chats/session-a.json".to_string(),
            fingerprint: "f00d".to_string(),
            last_imported: Utc::now(),
            record_count: 2,
        })
        .unwrap();
    }

    let reopened = Database::open(&db_path).unwrap();
    assert_eq!(reopened.list_file_states(Some("gemini")).unwrap().len(), 1);
    assert_eq!(reopened.count_all(&TelemetryFilter::all()).unwrap().total(), 0);
}
