mod parser;
mod schema;

use crate::Result;
use crate::discovery::collect_session_files;
use crate::pricing::PricingMode;
use crate::traits::SessionParser;
use std::path::{Path, PathBuf};
use usagetrace_types::{ImportResult, SourceType};

/// Claude Code transcripts: `*.jsonl` at any depth under the projects root
pub struct ClaudeParser {
    root: PathBuf,
    pricing_mode: PricingMode,
}

impl ClaudeParser {
    pub fn new(root: impl Into<PathBuf>, pricing_mode: PricingMode) -> Self {
        Self {
            root: root.into(),
            pricing_mode,
        }
    }
}

impl SessionParser for ClaudeParser {
    fn source(&self) -> SourceType {
        SourceType::ClaudeCode
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn find_session_files(&self) -> Result<Vec<PathBuf>> {
        collect_session_files(&self.root, |path| {
            path.extension().is_some_and(|ext| ext == "jsonl")
        })
    }

    fn parse_file(&self, path: &Path) -> Result<ImportResult> {
        parser::parse_claude_file(path, self.pricing_mode)
    }
}
