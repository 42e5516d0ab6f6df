use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use usagetrace_types::{ImportResult, SourceType};

use super::file_state::FileStatus;
use crate::store::RecordCounts;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSummary {
    pub files_seen: usize,
    pub new_files: usize,
    pub modified_files: usize,
    /// Unchanged files imported again because of `--force`
    pub forced_files: usize,
    pub skipped_files: usize,
    pub filtered_files: usize,
    pub failed_files: usize,
    pub logs: usize,
    pub metrics: usize,
    pub spans: usize,
}

impl SourceSummary {
    pub fn imported_files(&self) -> usize {
        self.new_files + self.modified_files + self.forced_files
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: PathBuf,
    pub source: SourceType,
    pub session_id: String,
    pub status: FileStatus,
    pub logs: usize,
    pub metrics: usize,
    pub spans: usize,
    pub record_count: usize,
    pub first_time: Option<DateTime<Utc>>,
    pub last_time: Option<DateTime<Utc>>,
}

/// A file that could not be fingerprinted or parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub source: SourceType,
    pub path: PathBuf,
    pub message: String,
}

/// A source whose discovery failed as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub source: SourceType,
    pub message: String,
}

/// What one import run found, accepted and (in a real run) wrote.
///
/// Totals always equal the sum over the results passed to `add`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub dry_run: bool,
    pub purge: bool,
    pub sources: BTreeMap<SourceType, SourceSummary>,
    pub files: Vec<FileSummary>,
    pub errors: Vec<FileError>,
    pub source_errors: Vec<SourceError>,
    /// Selected sources with no registered parser
    pub skipped_sources: Vec<SourceType>,
    /// Records removed by the purge; counted only, in a dry run
    pub purged: Option<RecordCounts>,
}

impl ImportSummary {
    pub fn new(dry_run: bool, purge: bool) -> Self {
        Self {
            dry_run,
            purge,
            ..Default::default()
        }
    }

    pub fn source_mut(&mut self, source: SourceType) -> &mut SourceSummary {
        self.sources.entry(source).or_default()
    }

    pub fn record_seen(&mut self, source: SourceType, count: usize) {
        self.source_mut(source).files_seen += count;
    }

    pub fn record_skipped(&mut self, source: SourceType) {
        self.source_mut(source).skipped_files += 1;
    }

    pub fn record_filtered(&mut self, source: SourceType) {
        self.source_mut(source).filtered_files += 1;
    }

    pub fn record_error(&mut self, source: SourceType, path: &Path, message: impl Into<String>) {
        self.source_mut(source).failed_files += 1;
        self.errors.push(FileError {
            source,
            path: path.to_path_buf(),
            message: message.into(),
        });
    }

    pub fn record_source_error(&mut self, source: SourceType, message: impl Into<String>) {
        self.source_mut(source);
        self.source_errors.push(SourceError {
            source,
            message: message.into(),
        });
    }

    /// Fold one accepted file into the per-source and per-file tallies
    pub fn add(&mut self, source: SourceType, result: &ImportResult, status: FileStatus) {
        let entry = self.source_mut(source);
        match status {
            FileStatus::New => entry.new_files += 1,
            FileStatus::Modified => entry.modified_files += 1,
            FileStatus::Current => entry.forced_files += 1,
        }
        entry.logs += result.logs.len();
        entry.metrics += result.metrics.len();
        entry.spans += result.spans.len();

        self.files.push(FileSummary {
            path: result.file_path.clone(),
            source,
            session_id: result.session_id.clone(),
            status,
            logs: result.logs.len(),
            metrics: result.metrics.len(),
            spans: result.spans.len(),
            record_count: result.record_count,
            first_time: result.first_time,
            last_time: result.last_time,
        });
    }

    pub fn total_logs(&self) -> usize {
        self.sources.values().map(|s| s.logs).sum()
    }

    pub fn total_metrics(&self) -> usize {
        self.sources.values().map(|s| s.metrics).sum()
    }

    pub fn total_spans(&self) -> usize {
        self.sources.values().map(|s| s.spans).sum()
    }

    pub fn totals(&self) -> RecordCounts {
        RecordCounts {
            logs: self.total_logs(),
            metrics: self.total_metrics(),
            spans: self.total_spans(),
        }
    }

    pub fn total_files_imported(&self) -> usize {
        self.sources.values().map(SourceSummary::imported_files).sum()
    }

    pub fn total_files_skipped(&self) -> usize {
        self.sources.values().map(|s| s.skipped_files).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.totals().total() == 0
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.source_errors.is_empty()
    }

    /// Per-file lines in path order, for deterministic output
    pub fn files_sorted(&self) -> Vec<&FileSummary> {
        let mut files: Vec<_> = self.files.iter().collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    pub fn errors_sorted(&self) -> Vec<&FileError> {
        let mut errors: Vec<_> = self.errors.iter().collect();
        errors.sort_by(|a, b| a.path.cmp(&b.path));
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usagetrace_types::LogRecord;

    fn result_with(path: &str, logs: usize) -> ImportResult {
        let mut result = ImportResult::new(path, "s");
        for _ in 0..logs {
            result.logs.push(LogRecord::info(Utc::now(), "codex", "codex.user_prompt"));
        }
        result.record_count = logs;
        result
    }

    #[test]
    fn test_totals_are_additive() {
        let mut summary = ImportSummary::new(false, false);
        summary.add(SourceType::Codex, &result_with("/b.jsonl", 2), FileStatus::New);
        summary.add(SourceType::Codex, &result_with("/a.jsonl", 3), FileStatus::Modified);
        summary.add(SourceType::Gemini, &result_with("/c.json", 1), FileStatus::Current);

        assert_eq!(summary.total_logs(), 6);
        assert_eq!(summary.total_metrics(), 0);
        assert_eq!(summary.total_files_imported(), 3);

        let codex = &summary.sources[&SourceType::Codex];
        assert_eq!((codex.new_files, codex.modified_files, codex.logs), (1, 1, 5));
        assert_eq!(summary.sources[&SourceType::Gemini].forced_files, 1);
    }

    #[test]
    fn test_empty_until_records_added() {
        let mut summary = ImportSummary::new(true, false);
        summary.record_seen(SourceType::ClaudeCode, 4);
        summary.record_skipped(SourceType::ClaudeCode);
        assert!(summary.is_empty());

        summary.add(SourceType::ClaudeCode, &result_with("/x.jsonl", 1), FileStatus::New);
        assert!(!summary.is_empty());
    }

    #[test]
    fn test_files_sorted_by_path() {
        let mut summary = ImportSummary::new(false, false);
        summary.add(SourceType::Codex, &result_with("/z.jsonl", 1), FileStatus::New);
        summary.add(SourceType::Codex, &result_with("/a.jsonl", 1), FileStatus::New);

        let paths: Vec<_> = summary.files_sorted().iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("/a.jsonl"), PathBuf::from("/z.jsonl")]);
    }

    #[test]
    fn test_errors_count_as_failed() {
        let mut summary = ImportSummary::new(false, false);
        summary.record_error(SourceType::Gemini, Path::new("/g.json"), "missing sessionId");
        summary.record_source_error(SourceType::Codex, "permission denied");

        assert!(summary.has_errors());
        assert_eq!(summary.sources[&SourceType::Gemini].failed_files, 1);
        assert!(summary.sources.contains_key(&SourceType::Codex));
    }
}
