use anyhow::Result;
use std::path::{Path, PathBuf};
use usagetrace_index::Database;
use usagetrace_providers::{ParserRegistry, PricingMode, SourceRoots};
use usagetrace_runtime::{Config, database_path};

/// Workspace paths and configuration shared by every command
pub struct ExecutionContext {
    data_dir: PathBuf,
    config: Config,
}

impl ExecutionContext {
    /// Loads `config.toml`; a missing file means defaults
    pub fn load(data_dir: PathBuf) -> Result<Self> {
        let config = Config::load_from(&Config::default_path(&data_dir))?;
        Ok(Self { data_dir, config })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn open_db(&self) -> Result<Database> {
        Ok(Database::open(&database_path(&self.data_dir))?)
    }

    /// Config file roots over environment over defaults
    pub fn roots(&self) -> SourceRoots {
        self.config.apply_roots(SourceRoots::from_env())
    }

    pub fn registry(&self, pricing_mode: PricingMode) -> ParserRegistry {
        self.config.build_registry(&self.roots(), pricing_mode)
    }
}
