mod parser;
mod schema;

use crate::Result;
use crate::discovery::{collect_session_files, file_name};
use crate::pricing::PricingMode;
use crate::traits::SessionParser;
use std::path::{Path, PathBuf};
use usagetrace_types::{ImportResult, SourceType};

/// Gemini CLI sessions: `<root>/<projectHash>/chats/session-*.json`
pub struct GeminiParser {
    root: PathBuf,
    pricing_mode: PricingMode,
}

impl GeminiParser {
    pub fn new(root: impl Into<PathBuf>, pricing_mode: PricingMode) -> Self {
        Self {
            root: root.into(),
            pricing_mode,
        }
    }
}

fn is_chat_file(path: &Path) -> bool {
    let name = file_name(path);
    let in_chats = path
        .parent()
        .and_then(|p| p.file_name())
        .is_some_and(|dir| dir == "chats");
    in_chats && name.starts_with("session-") && name.ends_with(".json")
}

impl SessionParser for GeminiParser {
    fn source(&self) -> SourceType {
        SourceType::Gemini
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn find_session_files(&self) -> Result<Vec<PathBuf>> {
        collect_session_files(&self.root, is_chat_file)
    }

    fn parse_file(&self, path: &Path) -> Result<ImportResult> {
        parser::parse_gemini_file(path, self.pricing_mode)
    }
}
