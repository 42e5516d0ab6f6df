use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid options or config file; raised before any file is touched
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Index error: {0}")]
    Index(#[from] usagetrace_index::Error),

    #[error("Provider error: {0}")]
    Provider(#[from] usagetrace_providers::Error),

    /// Telemetry store failure; always fatal to the run
    #[error("Store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Import cancelled")]
    Cancelled,
}

impl Error {
    pub fn store(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Store(err.into())
    }

    pub(crate) fn inverted_range(from: NaiveDate, to: NaiveDate) -> Self {
        Error::Config(format!("--from {} is after --to {}", from, to))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_keeps_source() {
        let err = Error::store(usagetrace_index::Error::Query("disk full".to_string()));
        assert!(err.to_string().starts_with("Store error:"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_inverted_range_message() {
        let from = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let err = Error::inverted_range(from, to);
        assert_eq!(
            err.to_string(),
            "Configuration error: --from 2025-06-02 is after --to 2025-06-01"
        );
    }
}
