use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{LogRecord, MetricDataPoint, Span};

/// Everything one session file produced.
///
/// Owned by the parse call that built it until it is folded into a summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub file_path: PathBuf,
    pub session_id: String,
    pub logs: Vec<LogRecord>,
    pub metrics: Vec<MetricDataPoint>,
    pub spans: Vec<Span>,
    /// Number of source entries that produced at least one record
    pub record_count: usize,
    pub first_time: Option<DateTime<Utc>>,
    pub last_time: Option<DateTime<Utc>>,
}

impl ImportResult {
    pub fn new(file_path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    /// Widen the time range to include `ts`
    pub fn observe_time(&mut self, ts: DateTime<Utc>) {
        self.first_time = Some(self.first_time.map_or(ts, |t| t.min(ts)));
        self.last_time = Some(self.last_time.map_or(ts, |t| t.max(ts)));
    }

    pub fn total_records(&self) -> usize {
        self.logs.len() + self.metrics.len() + self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_observe_time_tracks_min_and_max() {
        let mut result = ImportResult::new("/tmp/a.jsonl", "a");
        let t1 = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 3, 2, 1, 0, 0).unwrap();

        result.observe_time(t1);
        result.observe_time(t0);
        result.observe_time(t2);

        assert_eq!(result.first_time, Some(t0));
        assert_eq!(result.last_time, Some(t2));
        assert!(result.is_empty());
    }
}
