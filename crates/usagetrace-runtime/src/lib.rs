pub mod config;
pub mod error;
pub mod services;
pub mod store;

pub use config::{Config, SourceConfig, database_path, resolve_workspace_path};
pub use error::{Error, Result};
pub use services::file_state::{FileCheck, FileState, FileStateTracker, FileStatus, should_import_file};
pub use services::import::{ImportOptions, ImportOutcome, ImportProgress, ImportService};
pub use services::summary::{FileError, FileSummary, ImportSummary, SourceError, SourceSummary};
pub use store::{RecordCounts, StoreScope, TelemetryBatch, TelemetryStore};
