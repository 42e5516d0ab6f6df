use std::path::PathBuf;
use thiserror::Error;

/// Result type for usagetrace-providers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the providers layer
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Session parsing failed (missing required fields, invalid format, etc.)
    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The log root exists but could not be walked
    #[error("Discovery failed under {}: {source}", root.display())]
    Discovery {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Pricing mode name did not match any known mode
    #[error("unknown pricing mode '{0}' (expected one of: auto, calculate, display)")]
    UnknownPricingMode(String),
}

impl Error {
    pub(crate) fn parse(path: &std::path::Path, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
