// SQLite store
// Telemetry tables plus the per-file import state used for change detection

mod db;
mod error;
mod queries;
mod records;
mod schema;

// Public API
pub use db::Database;
pub use error::{Error, Result};
pub use records::{FileStateRecord, SessionKey, TelemetryCounts, TelemetryFilter};
pub use schema::SCHEMA_VERSION;
