use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::ops::Add;
use usagetrace_index::{Database, SessionKey, TelemetryCounts, TelemetryFilter};
use usagetrace_types::{ImportResult, LogRecord, MetricDataPoint, SourceType, Span, TimeRange, unix_nanos};

/// Time window and services a count, delete or query applies to.
///
/// Open bounds are unlimited; an empty `services` list matches any service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreScope {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub services: Vec<String>,
}

impl StoreScope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(range: TimeRange, services: Vec<String>) -> Self {
        Self {
            from: range.from,
            to: range.to,
            services,
        }
    }

    fn to_filter(&self) -> TelemetryFilter {
        TelemetryFilter {
            from_nanos: self.from.as_ref().map_or(i64::MIN, unix_nanos),
            to_nanos: self.to.as_ref().map_or(i64::MAX, unix_nanos),
            services: self.services.clone(),
        }
    }
}

/// Records of every accepted file, written in one `replace`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryBatch {
    pub logs: Vec<LogRecord>,
    pub metrics: Vec<MetricDataPoint>,
    pub spans: Vec<Span>,
    /// Sessions whose previously stored records this batch supersedes
    pub sessions: Vec<SessionKey>,
}

impl TelemetryBatch {
    pub fn extend_from(&mut self, source: SourceType, result: ImportResult) {
        if !result.session_id.is_empty() {
            let key = SessionKey::new(source.service_name(), result.session_id);
            if !self.sessions.contains(&key) {
                self.sessions.push(key);
            }
        }
        self.logs.extend(result.logs);
        self.metrics.extend(result.metrics);
        self.spans.extend(result.spans);
    }

    pub fn counts(&self) -> RecordCounts {
        RecordCounts {
            logs: self.logs.len(),
            metrics: self.metrics.len(),
            spans: self.spans.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub logs: usize,
    pub metrics: usize,
    pub spans: usize,
}

impl RecordCounts {
    pub fn total(&self) -> usize {
        self.logs + self.metrics + self.spans
    }
}

impl Add for RecordCounts {
    type Output = RecordCounts;

    fn add(self, rhs: Self) -> Self::Output {
        RecordCounts {
            logs: self.logs + rhs.logs,
            metrics: self.metrics + rhs.metrics,
            spans: self.spans + rhs.spans,
        }
    }
}

impl From<TelemetryCounts> for RecordCounts {
    fn from(counts: TelemetryCounts) -> Self {
        RecordCounts {
            logs: counts.logs,
            metrics: counts.metrics,
            spans: counts.spans,
        }
    }
}

/// Destination for canonical records.
///
/// Any failure is reported as `Error::Store` and aborts the import.
pub trait TelemetryStore {
    fn insert_logs(&self, logs: &[LogRecord]) -> Result<usize>;
    fn insert_metrics(&self, metrics: &[MetricDataPoint]) -> Result<usize>;
    fn insert_spans(&self, spans: &[Span]) -> Result<usize>;

    fn count_logs(&self, scope: &StoreScope) -> Result<usize>;
    fn count_metrics(&self, scope: &StoreScope) -> Result<usize>;
    fn count_spans(&self, scope: &StoreScope) -> Result<usize>;

    fn count_all(&self, scope: &StoreScope) -> Result<RecordCounts> {
        Ok(RecordCounts {
            logs: self.count_logs(scope)?,
            metrics: self.count_metrics(scope)?,
            spans: self.count_spans(scope)?,
        })
    }

    fn delete_logs(&self, scope: &StoreScope) -> Result<usize>;
    fn delete_metrics(&self, scope: &StoreScope) -> Result<usize>;
    fn delete_spans(&self, scope: &StoreScope) -> Result<usize>;

    /// Delete all three kinds in `scope` as one unit
    fn delete_all(&self, scope: &StoreScope) -> Result<RecordCounts>;

    fn query_logs(&self, scope: &StoreScope, limit: Option<usize>) -> Result<Vec<LogRecord>>;

    /// Delete `purge` (when given) and the stored records of `batch.sessions`,
    /// then write `batch`, atomically.
    ///
    /// Returns what the purge removed.
    fn replace(&self, purge: Option<&StoreScope>, batch: &TelemetryBatch) -> Result<RecordCounts>;
}

impl TelemetryStore for Database {
    fn insert_logs(&self, logs: &[LogRecord]) -> Result<usize> {
        Database::insert_logs(self, logs).map_err(Error::store)
    }

    fn insert_metrics(&self, metrics: &[MetricDataPoint]) -> Result<usize> {
        Database::insert_metrics(self, metrics).map_err(Error::store)
    }

    fn insert_spans(&self, spans: &[Span]) -> Result<usize> {
        Database::insert_spans(self, spans).map_err(Error::store)
    }

    fn count_logs(&self, scope: &StoreScope) -> Result<usize> {
        Database::count_logs(self, &scope.to_filter()).map_err(Error::store)
    }

    fn count_metrics(&self, scope: &StoreScope) -> Result<usize> {
        Database::count_metrics(self, &scope.to_filter()).map_err(Error::store)
    }

    fn count_spans(&self, scope: &StoreScope) -> Result<usize> {
        Database::count_spans(self, &scope.to_filter()).map_err(Error::store)
    }

    fn count_all(&self, scope: &StoreScope) -> Result<RecordCounts> {
        Database::count_all(self, &scope.to_filter())
            .map(RecordCounts::from)
            .map_err(Error::store)
    }

    fn delete_logs(&self, scope: &StoreScope) -> Result<usize> {
        Database::delete_logs(self, &scope.to_filter()).map_err(Error::store)
    }

    fn delete_metrics(&self, scope: &StoreScope) -> Result<usize> {
        Database::delete_metrics(self, &scope.to_filter()).map_err(Error::store)
    }

    fn delete_spans(&self, scope: &StoreScope) -> Result<usize> {
        Database::delete_spans(self, &scope.to_filter()).map_err(Error::store)
    }

    fn delete_all(&self, scope: &StoreScope) -> Result<RecordCounts> {
        Database::delete_all(self, &scope.to_filter())
            .map(RecordCounts::from)
            .map_err(Error::store)
    }

    fn query_logs(&self, scope: &StoreScope, limit: Option<usize>) -> Result<Vec<LogRecord>> {
        Database::query_logs(self, &scope.to_filter(), limit).map_err(Error::store)
    }

    fn replace(&self, purge: Option<&StoreScope>, batch: &TelemetryBatch) -> Result<RecordCounts> {
        let filter = purge.map(StoreScope::to_filter);
        self.replace_telemetry(filter.as_ref(), &batch.sessions, &batch.logs, &batch.metrics, &batch.spans)
            .map(RecordCounts::from)
            .map_err(Error::store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn log_on(day: u32, service: &str) -> LogRecord {
        let ts = Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap();
        LogRecord::info(ts, service, "test.event")
    }

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 6, d)
    }

    #[test]
    fn test_replace_purges_only_scope() {
        let db = Database::open_in_memory().unwrap();
        let store: &dyn TelemetryStore = &db;
        store
            .insert_logs(&[log_on(1, "codex"), log_on(2, "codex"), log_on(2, "claude-code")])
            .unwrap();

        let scope = StoreScope::new(TimeRange::from_dates(day(2), day(2)), vec!["codex".into()]);
        let batch = TelemetryBatch {
            logs: vec![log_on(2, "codex"), log_on(2, "codex")],
            ..Default::default()
        };

        let purged = store.replace(Some(&scope), &batch).unwrap();
        assert_eq!(purged, RecordCounts { logs: 1, metrics: 0, spans: 0 });
        assert_eq!(store.count_logs(&scope).unwrap(), 2);
        assert_eq!(store.count_all(&StoreScope::all()).unwrap().logs, 4);
    }

    #[test]
    fn test_replace_without_scope_only_inserts() {
        let db = Database::open_in_memory().unwrap();
        let store: &dyn TelemetryStore = &db;
        store.insert_logs(&[log_on(1, "gemini-cli")]).unwrap();

        let batch = TelemetryBatch {
            logs: vec![log_on(3, "gemini-cli")],
            ..Default::default()
        };
        let purged = store.replace(None, &batch).unwrap();

        assert_eq!(purged.total(), 0);
        assert_eq!(store.count_logs(&StoreScope::all()).unwrap(), 2);
    }

    #[test]
    fn test_delete_all_in_scope() {
        let db = Database::open_in_memory().unwrap();
        let store: &dyn TelemetryStore = &db;
        store.insert_logs(&[log_on(1, "codex"), log_on(5, "codex")]).unwrap();

        let early = StoreScope::new(TimeRange::from_dates(None, day(2)), Vec::new());
        assert_eq!(store.delete_all(&early).unwrap().logs, 1);

        let remaining = store.query_logs(&StoreScope::all(), None).unwrap();
        assert_eq!(remaining, vec![log_on(5, "codex")]);
    }

    #[test]
    fn test_batch_counts() {
        let mut batch = TelemetryBatch::default();
        assert!(batch.is_empty());

        let mut result = ImportResult::new("/s/a.jsonl", "a");
        result.logs.push(log_on(1, "codex"));
        batch.extend_from(SourceType::Codex, result.clone());
        batch.extend_from(SourceType::Codex, result);

        assert_eq!(batch.counts(), RecordCounts { logs: 2, metrics: 0, spans: 0 });
        assert_eq!(batch.sessions, vec![SessionKey::new("codex", "a")]);
        assert!(!batch.is_empty());
    }
}
