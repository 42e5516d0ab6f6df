use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Import state of one session file.
///
/// At most one row exists per `(source, file_path)`; a re-import overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStateRecord {
    /// Source identifier (`claude-code`, `codex`, `gemini`).
    pub source: String,
    /// Absolute path of the session file.
    pub file_path: String,
    /// SHA-256 of the file contents at last import.
    pub fingerprint: String,
    pub last_imported: DateTime<Utc>,
    /// Source entries that produced records at last import.
    pub record_count: i64,
}

/// Time and service scope for counting, deleting and querying telemetry.
///
/// Bounds are inclusive unix nanoseconds. An empty `services` list matches
/// every service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryFilter {
    pub from_nanos: i64,
    pub to_nanos: i64,
    pub services: Vec<String>,
}

impl TelemetryFilter {
    pub fn all() -> Self {
        Self {
            from_nanos: i64::MIN,
            to_nanos: i64::MAX,
            services: Vec::new(),
        }
    }
}

impl Default for TelemetryFilter {
    fn default() -> Self {
        Self::all()
    }
}

/// Records of one session of one service, as stamped in their `session.id` attribute
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub service: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(service: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            session_id: session_id.into(),
        }
    }
}

/// Row counts per telemetry table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounts {
    pub logs: usize,
    pub metrics: usize,
    pub spans: usize,
}

impl TelemetryCounts {
    pub fn total(&self) -> usize {
        self.logs + self.metrics + self.spans
    }
}

impl Add for TelemetryCounts {
    type Output = TelemetryCounts;

    fn add(self, rhs: Self) -> Self::Output {
        TelemetryCounts {
            logs: self.logs + rhs.logs,
            metrics: self.metrics + rhs.metrics,
            spans: self.spans + rhs.spans,
        }
    }
}
