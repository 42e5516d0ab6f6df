use std::path::{Path, PathBuf};
use usagetrace_types::SourceType;

/// Resolved discovery roots, one per source.
///
/// Resolved once at startup and handed to each parser's constructor, so tests
/// can point parsers anywhere without touching the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoots {
    pub claude_code: PathBuf,
    pub codex: PathBuf,
    pub gemini: PathBuf,
}

impl SourceRoots {
    /// Resolve from the process environment, falling back to home-relative defaults
    pub fn from_env() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        Self::resolve(&home, |key| std::env::var(key).ok())
    }

    /// Resolve against an explicit home directory and variable lookup
    pub fn resolve<F>(home: &Path, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |var: &str, sub: &str| {
            env(var)
                .filter(|v| !v.trim().is_empty())
                .map(|v| PathBuf::from(v).join(sub))
        };

        Self {
            claude_code: from_env("CLAUDE_CONFIG_DIR", "projects")
                .unwrap_or_else(|| home.join(".claude").join("projects")),
            codex: from_env("CODEX_HOME", "sessions")
                .unwrap_or_else(|| home.join(".codex").join("sessions")),
            gemini: from_env("GEMINI_HOME", "tmp")
                .unwrap_or_else(|| home.join(".gemini").join("tmp")),
        }
    }

    /// Same layout rooted under one directory; used by tests and fixtures
    pub fn under(base: &Path) -> Self {
        Self {
            claude_code: base.join(".claude").join("projects"),
            codex: base.join(".codex").join("sessions"),
            gemini: base.join(".gemini").join("tmp"),
        }
    }

    pub fn get(&self, source: SourceType) -> &Path {
        match source {
            SourceType::ClaudeCode => &self.claude_code,
            SourceType::Codex => &self.codex,
            SourceType::Gemini => &self.gemini,
        }
    }

    /// Replace one root, e.g. with a configured override
    pub fn with_root(mut self, source: SourceType, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        match source {
            SourceType::ClaudeCode => self.claude_code = root,
            SourceType::Codex => self.codex = root,
            SourceType::Gemini => self.gemini = root,
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_home_relative() {
        let roots = SourceRoots::resolve(Path::new("/home/dev"), |_| None);
        assert_eq!(roots.claude_code, PathBuf::from("/home/dev/.claude/projects"));
        assert_eq!(roots.codex, PathBuf::from("/home/dev/.codex/sessions"));
        assert_eq!(roots.gemini, PathBuf::from("/home/dev/.gemini/tmp"));
    }

    #[test]
    fn test_env_overrides_defaults() {
        let env: HashMap<&str, &str> = [("CODEX_HOME", "/opt/codex"), ("CLAUDE_CONFIG_DIR", "  ")]
            .into_iter()
            .collect();
        let roots = SourceRoots::resolve(Path::new("/home/dev"), |k| {
            env.get(k).map(|v| v.to_string())
        });

        assert_eq!(roots.codex, PathBuf::from("/opt/codex/sessions"));
        // Blank values are treated as unset
        assert_eq!(roots.claude_code, PathBuf::from("/home/dev/.claude/projects"));
    }

    #[test]
    fn test_with_root_replaces_one_source() {
        let roots = SourceRoots::under(Path::new("/x")).with_root(SourceType::Gemini, "/g");
        assert_eq!(roots.get(SourceType::Gemini), Path::new("/g"));
        assert_eq!(roots.get(SourceType::Codex), Path::new("/x/.codex/sessions"));
    }
}
