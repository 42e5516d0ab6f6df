use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// SHA-256 digest of a file's full contents, hex encoded
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash the full contents of `path`
///
/// Content, not mtime: copies and restores keep content but change mtime.
pub fn fingerprint_file(path: &Path) -> std::io::Result<Fingerprint> {
    let bytes = std::fs::read(path)?;
    Ok(Fingerprint::of_bytes(&bytes))
}

/// Parse an RFC 3339 timestamp as found in session logs
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn unix_nanos(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_nanos_opt().unwrap_or_else(|| {
        if ts.timestamp() < 0 {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

pub fn from_unix_nanos(nanos: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(nanos)
}

/// Inclusive time window; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// `from` starts at midnight, `to` runs to the last nanosecond of its day
    pub fn from_dates(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            from: from.map(|d| d.and_time(NaiveTime::MIN).and_utc()),
            to: to.map(end_of_day),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| ts >= from) && self.to.is_none_or(|to| ts <= to)
    }

    /// True if `[first, last]` overlaps this window
    pub fn intersects(&self, first: DateTime<Utc>, last: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| last >= from) && self.to.is_none_or(|to| first <= to)
    }

    pub fn from_nanos(&self) -> i64 {
        self.from.as_ref().map_or(i64::MIN, unix_nanos)
    }

    pub fn to_nanos(&self) -> i64 {
        self.to.as_ref().map_or(i64::MAX, unix_nanos)
    }
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    date.and_time(last).and_utc()
}
