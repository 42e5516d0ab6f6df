use crate::Result;
use std::path::{Path, PathBuf};
use usagetrace_types::{ImportResult, SourceType};

/// One source tool's session logs: where they live and how to read them.
///
/// Implementations hold their own root directory and pricing mode; both are
/// fixed at construction so a parser can be shared and called from any thread.
/// `parse_file` must not touch shared state; all per-file accumulators live
/// inside the call.
pub trait SessionParser: Send + Sync {
    /// Static identity of the tool this parser reads
    fn source(&self) -> SourceType;

    /// Directory searched by `find_session_files`
    fn root(&self) -> &Path;

    /// Enumerate candidate session files, sorted by path.
    ///
    /// A missing root is not an error and yields an empty list.
    fn find_session_files(&self) -> Result<Vec<PathBuf>>;

    /// Parse one file fully into canonical records
    fn parse_file(&self, path: &Path) -> Result<ImportResult>;
}
