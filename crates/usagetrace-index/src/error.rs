use thiserror::Error;

/// Result type for usagetrace-index operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error types that can occur in the index layer
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed
    #[error("{}", describe_database_error(.0))]
    Database(#[from] rusqlite::Error),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored JSON column could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Query-specific error (invalid input, not found, etc.)
    #[error("Query error: {0}")]
    Query(String),
}

fn describe_database_error(err: &rusqlite::Error) -> String {
    let msg = err.to_string();
    // Stale tables are rebuilt on open, so a missing column here means the file
    // was written by another version of usagetrace
    if msg.contains("no such column") || msg.contains("no such table") {
        format!(
            "Database schema mismatch ({}); delete usagetrace.db in the data directory and import again",
            msg
        )
    } else {
        format!("Database error: {}", msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(message: &str) -> Error {
        Error::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(1),
            Some(message.to_string()),
        ))
    }

    #[test]
    fn test_missing_table_suggests_deleting_the_database() {
        let msg = sqlite_failure("no such table: file_states").to_string();
        assert!(msg.starts_with("Database schema mismatch (no such table: file_states)"));
        assert!(msg.contains("delete usagetrace.db"));
    }

    #[test]
    fn test_other_failures_are_reported_plainly() {
        let msg = sqlite_failure("database is locked").to_string();
        assert_eq!(msg, "Database error: database is locked");
    }
}
