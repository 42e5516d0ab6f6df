use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The AI coding tools whose session logs can be imported.
///
/// Variant order is the canonical processing order used when `all` is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    ClaudeCode,
    Codex,
    Gemini,
}

impl SourceType {
    pub const ALL: [SourceType; 3] = [SourceType::ClaudeCode, SourceType::Codex, SourceType::Gemini];

    /// Stable identifier used in the state table and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::ClaudeCode => "claude-code",
            SourceType::Codex => "codex",
            SourceType::Gemini => "gemini",
        }
    }

    /// `service.name` attached to every record produced from this source
    pub fn service_name(&self) -> &'static str {
        match self {
            SourceType::ClaudeCode => "claude-code",
            SourceType::Codex => "codex",
            SourceType::Gemini => "gemini-cli",
        }
    }

    /// Prefix for metric names and log bodies (`<prefix>.token.usage`)
    pub fn metric_prefix(&self) -> &'static str {
        match self {
            SourceType::ClaudeCode => "claude_code",
            SourceType::Codex => "codex",
            SourceType::Gemini => "gemini_cli",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude-code" | "claude_code" | "claude" => Ok(SourceType::ClaudeCode),
            "codex" => Ok(SourceType::Codex),
            "gemini" | "gemini-cli" => Ok(SourceType::Gemini),
            _ => Err(Error::UnknownSource(s.to_string())),
        }
    }
}

/// A `--source` argument: one tool or every tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceSelector {
    #[default]
    All,
    One(SourceType),
}

impl SourceSelector {
    /// Expand to concrete sources in canonical order
    pub fn expand(&self) -> Vec<SourceType> {
        match self {
            SourceSelector::All => SourceType::ALL.to_vec(),
            SourceSelector::One(source) => vec![*source],
        }
    }
}

impl fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSelector::All => f.write_str("all"),
            SourceSelector::One(source) => source.fmt(f),
        }
    }
}

impl FromStr for SourceSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(SourceSelector::All);
        }
        s.parse().map(SourceSelector::One)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_expands_in_stable_order() {
        let selector: SourceSelector = "all".parse().unwrap();
        assert_eq!(
            selector.expand(),
            vec![SourceType::ClaudeCode, SourceType::Codex, SourceType::Gemini]
        );

        let upper: SourceSelector = "ALL".parse().unwrap();
        assert_eq!(upper.expand(), selector.expand());
    }

    #[test]
    fn test_source_names_round_trip() {
        for source in SourceType::ALL {
            assert_eq!(source.as_str().parse::<SourceType>().unwrap(), source);
        }
        assert_eq!("Codex".parse::<SourceType>().unwrap(), SourceType::Codex);
        assert_eq!("claude".parse::<SourceType>().unwrap(), SourceType::ClaudeCode);
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let err = "cursor".parse::<SourceSelector>().unwrap_err();
        assert!(err.to_string().contains("unknown source 'cursor'"));
    }
}
