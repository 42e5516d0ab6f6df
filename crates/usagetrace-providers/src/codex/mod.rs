mod parser;
mod schema;

use crate::Result;
use crate::discovery::{collect_session_files, file_name};
use crate::pricing::PricingMode;
use crate::traits::SessionParser;
use std::path::{Path, PathBuf};
use usagetrace_types::{ImportResult, SourceType};

/// Codex CLI rollouts: `rollout-*.jsonl` under the sessions root
/// (nested by `YYYY/MM/DD` in current versions)
pub struct CodexParser {
    root: PathBuf,
    pricing_mode: PricingMode,
}

impl CodexParser {
    pub fn new(root: impl Into<PathBuf>, pricing_mode: PricingMode) -> Self {
        Self {
            root: root.into(),
            pricing_mode,
        }
    }
}

impl SessionParser for CodexParser {
    fn source(&self) -> SourceType {
        SourceType::Codex
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn find_session_files(&self) -> Result<Vec<PathBuf>> {
        collect_session_files(&self.root, |path| {
            let name = file_name(path);
            name.starts_with("rollout-") && name.ends_with(".jsonl")
        })
    }

    fn parse_file(&self, path: &Path) -> Result<ImportResult> {
        parser::parse_codex_file(path, self.pricing_mode)
    }
}
