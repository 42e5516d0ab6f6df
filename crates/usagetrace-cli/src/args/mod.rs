mod commands;

pub use commands::*;

use clap::Parser;

use crate::types::LogLevel;

#[derive(Parser)]
#[command(name = "usagetrace")]
#[command(about = "Import AI coding-tool session logs as canonical telemetry", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Workspace directory holding the database and config.toml
    /// [default: $USAGETRACE_PATH, else the platform data directory]
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}
