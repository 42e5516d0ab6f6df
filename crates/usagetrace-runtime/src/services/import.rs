use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use usagetrace_index::Database;
use usagetrace_providers::{ParserRegistry, SessionParser};
use usagetrace_types::{Fingerprint, ImportResult, SourceSelector, SourceType, TimeRange};

use super::file_state::{FileStateTracker, FileStatus, should_import_file};
use super::summary::ImportSummary;
use crate::store::{RecordCounts, StoreScope, TelemetryBatch, TelemetryStore};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub selector: SourceSelector,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub dry_run: bool,
    /// Re-import files whose content has not changed
    pub force: bool,
    /// Delete stored records in the selected range and sources first
    pub purge: bool,
    pub skip_confirm: bool,
}

impl ImportOptions {
    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(Error::inverted_range(from, to));
        }
        Ok(())
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange::from_dates(self.from, self.to)
    }
}

#[derive(Debug, Clone)]
pub enum ImportProgress {
    SourceStarted {
        source: SourceType,
    },
    SourceSkipped {
        source: SourceType,
        reason: String,
    },
    RootMissing {
        source: SourceType,
        root: PathBuf,
    },
    SourceFailed {
        source: SourceType,
        message: String,
    },
    FilesDiscovered {
        source: SourceType,
        count: usize,
        eligible: usize,
    },
    FileSkipped {
        source: SourceType,
        path: PathBuf,
    },
    FileFiltered {
        source: SourceType,
        path: PathBuf,
    },
    FileParsed {
        source: SourceType,
        path: PathBuf,
        status: FileStatus,
        records: RecordCounts,
    },
    FileFailed {
        source: SourceType,
        path: PathBuf,
        message: String,
    },
    Purging {
        services: Vec<String>,
        dry_run: bool,
    },
    Writing {
        records: RecordCounts,
    },
    Completed {
        records: RecordCounts,
        files: usize,
    },
}

/// How a run ended. Every variant carries the summary of what was found.
#[derive(Debug, Clone)]
pub enum ImportOutcome {
    /// Nothing written; the summary shows what a real run would do
    DryRun(ImportSummary),
    /// No records found and no purge requested
    NothingToImport(ImportSummary),
    /// The user declined the confirmation prompt; nothing written
    Declined(ImportSummary),
    Imported(ImportSummary),
}

impl ImportOutcome {
    pub fn summary(&self) -> &ImportSummary {
        match self {
            ImportOutcome::DryRun(s)
            | ImportOutcome::NothingToImport(s)
            | ImportOutcome::Declined(s)
            | ImportOutcome::Imported(s) => s,
        }
    }

    pub fn into_summary(self) -> ImportSummary {
        match self {
            ImportOutcome::DryRun(s)
            | ImportOutcome::NothingToImport(s)
            | ImportOutcome::Declined(s)
            | ImportOutcome::Imported(s) => s,
        }
    }
}

/// A file that passed the status gate, with the fingerprint it was checked against
struct Candidate {
    source: SourceType,
    path: PathBuf,
    status: FileStatus,
    fingerprint: Fingerprint,
}

/// A parsed file whose state is recorded once its records are stored
struct Accepted {
    source: SourceType,
    path: PathBuf,
    fingerprint: Fingerprint,
    record_count: usize,
}

pub struct ImportService<'a> {
    db: &'a Database,
    store: &'a dyn TelemetryStore,
    registry: &'a ParserRegistry,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> ImportService<'a> {
    /// `db` holds file state; `store` receives the records. They may be the same database.
    pub fn new(db: &'a Database, store: &'a dyn TelemetryStore, registry: &'a ParserRegistry) -> Self {
        Self {
            db,
            store,
            registry,
            cancel: None,
        }
    }

    /// Checked between files; once set the run stops before writing anything
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn run<F, C>(&self, options: &ImportOptions, mut on_progress: F, confirm: C) -> Result<ImportOutcome>
    where
        F: FnMut(ImportProgress),
        C: FnOnce(&ImportSummary) -> bool,
    {
        options.validate()?;

        let range = options.time_range();
        let tracker = FileStateTracker::new(self.db);
        let mut summary = ImportSummary::new(options.dry_run, options.purge);

        // Discover and classify
        let mut candidates = Vec::new();
        let mut services = Vec::new();
        for source in options.selector.expand() {
            on_progress(ImportProgress::SourceStarted { source });

            let Some(parser) = self.registry.get(source) else {
                warn!(source = %source, "no parser registered, skipping source");
                summary.skipped_sources.push(source);
                on_progress(ImportProgress::SourceSkipped {
                    source,
                    reason: "no parser registered".to_string(),
                });
                continue;
            };
            services.push(source.service_name().to_string());

            // A purged source is rewritten in full, so unchanged files must be read again
            let reread_all = options.force || options.purge;
            self.discover(parser, &tracker, reread_all, &mut summary, &mut candidates, &mut on_progress);
        }

        // Purge scope covers only sources that actually have a parser
        let purge_scope = (options.purge && !services.is_empty()).then(|| StoreScope::new(range, services));
        if let Some(scope) = &purge_scope {
            on_progress(ImportProgress::Purging {
                services: scope.services.clone(),
                dry_run: options.dry_run,
            });
            if options.dry_run {
                summary.purged = Some(self.store.count_all(scope)?);
            }
        }

        // Parse
        let mut batch = TelemetryBatch::default();
        let mut accepted = Vec::new();
        for candidate in candidates {
            self.ensure_not_cancelled()?;

            let Some(parser) = self.registry.get(candidate.source) else {
                continue;
            };
            if let Some(result) = parse_candidate(parser, &candidate, &range, &mut summary, &mut on_progress) {
                accepted.push(Accepted {
                    source: candidate.source,
                    path: candidate.path,
                    fingerprint: candidate.fingerprint,
                    record_count: result.record_count,
                });
                batch.extend_from(candidate.source, result);
            }
        }

        if options.dry_run {
            on_progress(ImportProgress::Completed {
                records: summary.totals(),
                files: accepted.len(),
            });
            return Ok(ImportOutcome::DryRun(summary));
        }

        if summary.is_empty() && purge_scope.is_none() {
            // Files that produced nothing are still remembered so they are not re-read
            self.record_accepted(&tracker, &accepted)?;
            return Ok(ImportOutcome::NothingToImport(summary));
        }

        if !options.skip_confirm && !confirm(&summary) {
            info!("import declined");
            return Ok(ImportOutcome::Declined(summary));
        }

        self.ensure_not_cancelled()?;

        on_progress(ImportProgress::Writing {
            records: batch.counts(),
        });
        let purged = self.store.replace(purge_scope.as_ref(), &batch)?;
        if purge_scope.is_some() {
            summary.purged = Some(purged);
        }

        self.record_accepted(&tracker, &accepted)?;

        info!(
            files = accepted.len(),
            logs = batch.logs.len(),
            metrics = batch.metrics.len(),
            spans = batch.spans.len(),
            purged = purged.total(),
            "import complete"
        );
        on_progress(ImportProgress::Completed {
            records: summary.totals(),
            files: accepted.len(),
        });
        Ok(ImportOutcome::Imported(summary))
    }

    fn discover<F>(
        &self,
        parser: &dyn SessionParser,
        tracker: &FileStateTracker<'_>,
        force: bool,
        summary: &mut ImportSummary,
        candidates: &mut Vec<Candidate>,
        on_progress: &mut F,
    ) where
        F: FnMut(ImportProgress),
    {
        let source = parser.source();
        summary.source_mut(source);

        if !parser.root().exists() {
            debug!(source = %source, root = %parser.root().display(), "log root missing");
            on_progress(ImportProgress::RootMissing {
                source,
                root: parser.root().to_path_buf(),
            });
            return;
        }

        let files = match parser.find_session_files() {
            Ok(files) => files,
            Err(e) => {
                warn!(source = %source, error = %e, "discovery failed");
                summary.record_source_error(source, e.to_string());
                on_progress(ImportProgress::SourceFailed {
                    source,
                    message: e.to_string(),
                });
                return;
            }
        };
        summary.record_seen(source, files.len());

        let before = candidates.len();
        for path in files {
            let check = match tracker.check_file_status(source, &path) {
                Ok(check) => check,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not fingerprint file");
                    summary.record_error(source, &path, e.to_string());
                    on_progress(ImportProgress::FileFailed {
                        source,
                        path,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if !should_import_file(check.status, force) {
                summary.record_skipped(source);
                on_progress(ImportProgress::FileSkipped { source, path });
                continue;
            }

            candidates.push(Candidate {
                source,
                path,
                status: check.status,
                fingerprint: check.fingerprint,
            });
        }

        let eligible = candidates.len() - before;
        debug!(source = %source, seen = summary.sources[&source].files_seen, eligible, "discovered files");
        on_progress(ImportProgress::FilesDiscovered {
            source,
            count: summary.sources[&source].files_seen,
            eligible,
        });
    }

    fn record_accepted(&self, tracker: &FileStateTracker<'_>, accepted: &[Accepted]) -> Result<()> {
        for file in accepted {
            tracker.record_fingerprint(file.source, &file.path, &file.fingerprint, file.record_count)?;
        }
        Ok(())
    }

    fn ensure_not_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::SeqCst) => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Parse one file and fold it into the summary.
///
/// Returns `None` when the file failed or falls outside the date range.
fn parse_candidate<F>(
    parser: &dyn SessionParser,
    candidate: &Candidate,
    range: &TimeRange,
    summary: &mut ImportSummary,
    on_progress: &mut F,
) -> Option<ImportResult>
where
    F: FnMut(ImportProgress),
{
    let source = candidate.source;
    let path = &candidate.path;

    let result = match parser.parse_file(path) {
        Ok(result) => result,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse session file");
            summary.record_error(source, path, e.to_string());
            on_progress(ImportProgress::FileFailed {
                source,
                path: path.clone(),
                message: e.to_string(),
            });
            return None;
        }
    };

    if !within_range(&result, range) {
        debug!(path = %path.display(), "outside date range");
        summary.record_filtered(source);
        on_progress(ImportProgress::FileFiltered {
            source,
            path: path.clone(),
        });
        return None;
    }

    debug!(
        path = %path.display(),
        session = %result.session_id,
        records = result.total_records(),
        "parsed session file"
    );
    summary.add(source, &result, candidate.status);
    on_progress(ImportProgress::FileParsed {
        source,
        path: path.clone(),
        status: candidate.status,
        records: RecordCounts {
            logs: result.logs.len(),
            metrics: result.metrics.len(),
            spans: result.spans.len(),
        },
    });
    Some(result)
}

/// Whole-file filter: a file is kept when its time span overlaps the range
fn within_range(result: &ImportResult, range: &TimeRange) -> bool {
    if range.is_unbounded() {
        return true;
    }
    match (result.first_time, result.last_time) {
        (Some(first), Some(last)) => range.intersects(first, last),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 6, d)
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let options = ImportOptions {
            from: date(3),
            to: date(1),
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::Config(_))));

        let same_day = ImportOptions {
            from: date(1),
            to: date(1),
            ..Default::default()
        };
        assert!(same_day.validate().is_ok());
    }

    #[test]
    fn test_untimed_result_is_filtered_only_with_a_range() {
        let result = ImportResult::new("/a.jsonl", "a");
        assert!(within_range(&result, &TimeRange::unbounded()));
        assert!(!within_range(&result, &TimeRange::from_dates(date(1), None)));
    }

    #[test]
    fn test_unregistered_sources_are_skipped() {
        let db = Database::open_in_memory().unwrap();
        let registry = ParserRegistry::new();
        let service = ImportService::new(&db, &db, &registry);

        let outcome = service.run(&ImportOptions::default(), |_| {}, |_| true).unwrap();
        assert!(matches!(outcome, ImportOutcome::NothingToImport(_)));
        assert_eq!(outcome.summary().skipped_sources, SourceType::ALL.to_vec());
    }
}
