use thiserror::Error;

/// Result type for usagetrace-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug, Error)]
pub enum Error {
    /// Source name did not match any known tool
    #[error("unknown source '{0}' (expected one of: claude-code, codex, gemini, all)")]
    UnknownSource(String),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
