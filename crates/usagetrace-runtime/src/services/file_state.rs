use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use usagetrace_index::{Database, FileStateRecord};
use usagetrace_types::{Fingerprint, SourceType, fingerprint_file};

/// How a discovered file relates to its last import
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileStatus {
    /// Never imported
    New,
    /// Imported before, content has changed since
    Modified,
    /// Imported before, content unchanged
    Current,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::New => "new",
            FileStatus::Modified => "modified",
            FileStatus::Current => "current",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification plus the fingerprint it was based on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheck {
    pub status: FileStatus,
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileState {
    pub source: SourceType,
    pub file_path: PathBuf,
    pub fingerprint: Fingerprint,
    pub last_imported: DateTime<Utc>,
    pub record_count: usize,
}

impl TryFrom<FileStateRecord> for FileState {
    type Error = Error;

    fn try_from(record: FileStateRecord) -> Result<Self> {
        let source = record
            .source
            .parse()
            .map_err(|_| Error::Config(format!("unknown source '{}' in file state", record.source)))?;

        Ok(Self {
            source,
            file_path: PathBuf::from(record.file_path),
            fingerprint: Fingerprint::new(record.fingerprint),
            last_imported: record.last_imported,
            record_count: usize::try_from(record.record_count).unwrap_or(0),
        })
    }
}

/// `Current` files are imported again only when forced
pub fn should_import_file(status: FileStatus, force: bool) -> bool {
    force || status != FileStatus::Current
}

/// Remembers which session files were imported and what they contained.
///
/// Files are keyed by `(source, absolute path)`; the fingerprint is a content
/// hash, so touching a file without changing it never triggers a re-import.
pub struct FileStateTracker<'a> {
    db: &'a Database,
}

impl<'a> FileStateTracker<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn check_file_status(&self, source: SourceType, path: &Path) -> Result<FileCheck> {
        let fingerprint = fingerprint_file(path)?;
        let stored = self.db.get_file_state(source.as_str(), &state_key(path))?;

        let status = match stored {
            None => FileStatus::New,
            Some(state) if state.fingerprint == fingerprint.as_str() => FileStatus::Current,
            Some(_) => FileStatus::Modified,
        };

        Ok(FileCheck {
            status,
            fingerprint,
        })
    }

    /// Fingerprint the file as it is now and mark it imported
    pub fn record_import(&self, source: SourceType, path: &Path, record_count: usize) -> Result<()> {
        let fingerprint = fingerprint_file(path)?;
        self.record_fingerprint(source, path, &fingerprint, record_count)
    }

    /// Mark the file imported with a fingerprint taken before it was parsed
    pub fn record_fingerprint(
        &self,
        source: SourceType,
        path: &Path,
        fingerprint: &Fingerprint,
        record_count: usize,
    ) -> Result<()> {
        self.db.upsert_file_state(&FileStateRecord {
            source: source.as_str().to_string(),
            file_path: state_key(path),
            fingerprint: fingerprint.as_str().to_string(),
            last_imported: Utc::now(),
            record_count: i64::try_from(record_count).unwrap_or(i64::MAX),
        })?;
        Ok(())
    }

    pub fn get_imported_files(&self, source: Option<SourceType>) -> Result<Vec<FileState>> {
        self.db
            .list_file_states(source.map(|s| s.as_str()))?
            .into_iter()
            .map(FileState::try_from)
            .collect()
    }

    /// Forget every file of `source`; returns how many were removed
    pub fn clear_source(&self, source: SourceType) -> Result<usize> {
        Ok(self.db.delete_file_states(source.as_str())?)
    }
}

fn state_key(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_status_follows_content() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("rollout-a.jsonl");
        std::fs::write(&path, "{}\n")?;

        let db = Database::open_in_memory()?;
        let tracker = FileStateTracker::new(&db);

        let first = tracker.check_file_status(SourceType::Codex, &path)?;
        assert_eq!(first.status, FileStatus::New);

        tracker.record_fingerprint(SourceType::Codex, &path, &first.fingerprint, 1)?;
        assert_eq!(tracker.check_file_status(SourceType::Codex, &path)?.status, FileStatus::Current);

        // Same path under another source is a different file
        assert_eq!(tracker.check_file_status(SourceType::Gemini, &path)?.status, FileStatus::New);

        std::fs::write(&path, "{}\n{}\n")?;
        assert_eq!(tracker.check_file_status(SourceType::Codex, &path)?.status, FileStatus::Modified);

        tracker.record_import(SourceType::Codex, &path, 2)?;
        assert_eq!(tracker.check_file_status(SourceType::Codex, &path)?.status, FileStatus::Current);
        Ok(())
    }

    #[test]
    fn test_clear_source_resets_to_new() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("session.jsonl");
        std::fs::write(&path, "x")?;

        let db = Database::open_in_memory()?;
        let tracker = FileStateTracker::new(&db);
        tracker.record_import(SourceType::ClaudeCode, &path, 3)?;

        let files = tracker.get_imported_files(Some(SourceType::ClaudeCode))?;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].record_count, 3);
        assert!(files[0].file_path.is_absolute());

        assert_eq!(tracker.clear_source(SourceType::ClaudeCode)?, 1);
        assert!(tracker.get_imported_files(None)?.is_empty());
        assert_eq!(tracker.check_file_status(SourceType::ClaudeCode, &path)?.status, FileStatus::New);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let tracker = FileStateTracker::new(&db);
        let err = tracker
            .check_file_status(SourceType::Codex, Path::new("/nonexistent/rollout.jsonl"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_should_import_file() {
        assert!(should_import_file(FileStatus::New, false));
        assert!(should_import_file(FileStatus::Modified, false));
        assert!(!should_import_file(FileStatus::Current, false));
        assert!(should_import_file(FileStatus::Current, true));
    }
}
