use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use usagetrace_providers::{ParserRegistry, PricingMode, SourceRoots, create_parser};
use usagetrace_types::SourceType;

const WORKSPACE_ENV: &str = "USAGETRACE_PATH";
const WORKSPACE_DIR: &str = "usagetrace";

/// Resolve the workspace data directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. USAGETRACE_PATH environment variable (with tilde expansion)
/// 3. XDG data directory
/// 4. ~/.usagetrace
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(WORKSPACE_ENV)
        && !env_path.trim().is_empty()
    {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join(WORKSPACE_DIR));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(format!(".{}", WORKSPACE_DIR)));
    }

    Err(Error::Config(
        "Could not determine workspace path: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

/// Location of the telemetry database inside a workspace
pub fn database_path(workspace: &Path) -> PathBuf {
    workspace.join("usagetrace.db")
}

/// Expand a leading `~/` to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

fn default_enabled() -> bool {
    true
}

/// Per-source overrides from `[sources.<name>]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Takes precedence over the environment and the default root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_root: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_root: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Used when `--pricing` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: BTreeMap<String, SourceConfig>,
    #[serde(default)]
    pub import: ImportConfig,
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path(workspace: &Path) -> PathBuf {
        workspace.join("config.toml")
    }

    /// Every `[sources.<name>]` key must name a known source
    pub fn validate(&self) -> Result<()> {
        for name in self.sources.keys() {
            name.parse::<SourceType>().map_err(|_| {
                Error::Config(format!("unknown source '{}' in [sources]", name))
            })?;
        }
        Ok(())
    }

    /// Entry for `source`, matched by any accepted spelling of its name
    pub fn source(&self, source: SourceType) -> Option<&SourceConfig> {
        self.sources
            .iter()
            .find(|(name, _)| name.parse::<SourceType>().ok() == Some(source))
            .map(|(_, config)| config)
    }

    pub fn is_enabled(&self, source: SourceType) -> bool {
        self.source(source).is_none_or(|c| c.enabled)
    }

    pub fn set_source(&mut self, source: SourceType, config: SourceConfig) {
        self.sources.retain(|name, _| name.parse::<SourceType>().ok() != Some(source));
        self.sources.insert(source.as_str().to_string(), config);
    }

    /// Apply configured `log_root` overrides on top of env/default roots
    pub fn apply_roots(&self, mut roots: SourceRoots) -> SourceRoots {
        for source in SourceType::ALL {
            if let Some(root) = self.source(source).and_then(|c| c.log_root.as_ref()) {
                roots = roots.with_root(source, expand_tilde(&root.to_string_lossy()));
            }
        }
        roots
    }

    /// Register a parser for every enabled source
    pub fn build_registry(&self, roots: &SourceRoots, pricing_mode: PricingMode) -> ParserRegistry {
        let mut registry = ParserRegistry::new();
        for source in SourceType::ALL {
            if self.is_enabled(source) {
                registry.register(create_parser(source, roots.get(source), pricing_mode));
            }
        }
        registry
    }

    /// `--pricing` wins, then the config file, then `auto`
    pub fn pricing_mode(&self, flag: Option<PricingMode>) -> PricingMode {
        flag.or(self.import.pricing).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.sources.is_empty());
        assert!(SourceType::ALL.iter().all(|s| config.is_enabled(*s)));
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = Config::default_path(temp_dir.path());

        let mut config = Config::default();
        config.set_source(
            SourceType::Codex,
            SourceConfig {
                enabled: true,
                log_root: Some(PathBuf::from("/srv/codex/sessions")),
            },
        );
        config.import.pricing = Some(PricingMode::Calculate);
        config.save_to(&config_path)?;

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let loaded = Config::load_from(&temp_dir.path().join("absent.toml"))?;
        assert_eq!(loaded, Config::default());
        Ok(())
    }

    #[test]
    fn test_unknown_source_key_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[sources.cursor]\nenabled = false\n")?;

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("cursor")));
        Ok(())
    }

    #[test]
    fn test_config_root_overrides_resolved_root() {
        let toml = r#"
            [sources.claude]
            log_root = "/data/claude"

            [sources.gemini]
            enabled = false
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let roots = config.apply_roots(SourceRoots::under(Path::new("/home/u")));

        assert_eq!(roots.claude_code, PathBuf::from("/data/claude"));
        assert_eq!(roots.codex, PathBuf::from("/home/u/.codex/sessions"));

        let registry = config.build_registry(&roots, PricingMode::Auto);
        assert_eq!(registry.sources(), vec![SourceType::ClaudeCode, SourceType::Codex]);
        assert!(!config.is_enabled(SourceType::Gemini));
    }

    #[test]
    fn test_pricing_mode_precedence() {
        let mut config = Config::default();
        assert_eq!(config.pricing_mode(None), PricingMode::Auto);

        config.import.pricing = Some(PricingMode::Display);
        assert_eq!(config.pricing_mode(None), PricingMode::Display);
        assert_eq!(config.pricing_mode(Some(PricingMode::Calculate)), PricingMode::Calculate);
    }

    #[test]
    fn test_explicit_workspace_path_wins() -> Result<()> {
        let path = resolve_workspace_path(Some("/tmp/ut-data"))?;
        assert_eq!(path, PathBuf::from("/tmp/ut-data"));
        assert_eq!(database_path(&path), PathBuf::from("/tmp/ut-data/usagetrace.db"));
        Ok(())
    }
}
