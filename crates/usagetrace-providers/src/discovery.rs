use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Walk `root` and collect non-empty files accepted by `accept`, sorted by path.
///
/// A missing root yields an empty list. Failure to read the root itself is a
/// discovery error; unreadable entries below it are skipped with a warning.
pub(crate) fn collect_session_files<F>(root: &Path, accept: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(Error::Discovery {
                    root: root.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                warn!(root = %root.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !accept(path) {
            continue;
        }

        if let Ok(metadata) = entry.metadata()
            && metadata.len() == 0
        {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

pub(crate) fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|f| f.to_str()).unwrap_or("")
}
