use crate::pricing::PricingMode;
use crate::roots::SourceRoots;
use crate::traits::SessionParser;
use crate::{ClaudeParser, CodexParser, GeminiParser};
use std::collections::BTreeMap;
use std::path::PathBuf;
use usagetrace_types::SourceType;

#[derive(Debug, Clone)]
pub struct SourceMetadata {
    pub source: SourceType,
    pub description: &'static str,
    pub default_log_path: &'static str,
    pub env_var: &'static str,
}

const SOURCES: &[SourceMetadata] = &[
    SourceMetadata {
        source: SourceType::ClaudeCode,
        description: "Claude Code CLI",
        default_log_path: "~/.claude/projects",
        env_var: "CLAUDE_CONFIG_DIR",
    },
    SourceMetadata {
        source: SourceType::Codex,
        description: "Codex CLI",
        default_log_path: "~/.codex/sessions",
        env_var: "CODEX_HOME",
    },
    SourceMetadata {
        source: SourceType::Gemini,
        description: "Gemini CLI",
        default_log_path: "~/.gemini/tmp",
        env_var: "GEMINI_HOME",
    },
];

pub fn get_all_sources() -> &'static [SourceMetadata] {
    SOURCES
}

pub fn get_source_metadata(source: SourceType) -> Option<&'static SourceMetadata> {
    SOURCES.iter().find(|m| m.source == source)
}

/// Built-in parser for `source`, reading from `root`
pub fn create_parser(
    source: SourceType,
    root: impl Into<PathBuf>,
    pricing_mode: PricingMode,
) -> Box<dyn SessionParser> {
    match source {
        SourceType::ClaudeCode => Box::new(ClaudeParser::new(root, pricing_mode)),
        SourceType::Codex => Box::new(CodexParser::new(root, pricing_mode)),
        SourceType::Gemini => Box::new(GeminiParser::new(root, pricing_mode)),
    }
}

/// Parsers keyed by source. The orchestrator only ever looks parsers up by
/// key, so a new tool needs a parser and a registration here, nothing else.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: BTreeMap<SourceType, Box<dyn SessionParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the three built-in parsers
    pub fn with_defaults(roots: &SourceRoots, pricing_mode: PricingMode) -> Self {
        let mut registry = Self::new();
        for source in SourceType::ALL {
            registry.register(create_parser(source, roots.get(source), pricing_mode));
        }
        registry
    }

    /// Replaces any parser already registered for the same source
    pub fn register(&mut self, parser: Box<dyn SessionParser>) {
        self.parsers.insert(parser.source(), parser);
    }

    pub fn get(&self, source: SourceType) -> Option<&dyn SessionParser> {
        self.parsers.get(&source).map(|p| p.as_ref())
    }

    pub fn sources(&self) -> Vec<SourceType> {
        self.parsers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults_register_every_source() {
        let roots = SourceRoots::under(Path::new("/tmp/nowhere"));
        let registry = ParserRegistry::with_defaults(&roots, PricingMode::Auto);

        assert_eq!(registry.sources(), SourceType::ALL.to_vec());
        let codex = registry.get(SourceType::Codex).unwrap();
        assert_eq!(codex.root(), Path::new("/tmp/nowhere/.codex/sessions"));
    }

    #[test]
    fn test_metadata_covers_every_source() {
        for source in SourceType::ALL {
            assert!(get_source_metadata(source).is_some(), "{source} missing");
        }
    }
}
