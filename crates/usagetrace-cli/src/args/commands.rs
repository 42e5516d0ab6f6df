use chrono::NaiveDate;
use clap::{Args, Subcommand};
use usagetrace_providers::PricingMode;
use usagetrace_types::{SourceSelector, SourceType};

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Import session logs into the telemetry store")]
    Import(ImportArgs),

    #[command(about = "Inspect or reset per-file import state")]
    State {
        #[command(subcommand)]
        command: StateCommand,
    },

    #[command(about = "Show known sources and where their logs are read from")]
    Sources,
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// claude-code, codex, gemini or all
    #[arg(long, default_value = "all")]
    pub source: SourceSelector,

    /// Only sessions active on or after this day (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Only sessions active on or before this day (YYYY-MM-DD, UTC)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Parse and report without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Re-import files that have not changed since the last import
    #[arg(long)]
    pub force: bool,

    /// Delete stored records for the selected sources and range before writing
    #[arg(long)]
    pub purge: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Report every file and progress step
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// auto, calculate or display [default: from config, else auto]
    #[arg(long)]
    pub pricing: Option<PricingMode>,
}

#[derive(Subcommand)]
pub enum StateCommand {
    #[command(about = "List imported files")]
    List {
        #[arg(long)]
        source: Option<SourceType>,
    },

    #[command(about = "Forget imported files so the next import reads them again")]
    Clear {
        #[arg(long)]
        source: SourceType,
    },
}

#[cfg(test)]
mod tests {
    use crate::args::Cli;
    use crate::{Commands, StateCommand};
    use clap::{CommandFactory, Parser};
    use usagetrace_types::{SourceSelector, SourceType};

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_import_defaults() {
        let cli = Cli::parse_from(["usagetrace", "import"]);
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.source, SourceSelector::All);
        assert!(!args.dry_run && !args.force && !args.purge && !args.yes);
        assert_eq!(args.pricing, None);
    }

    #[test]
    fn test_import_flags() {
        let cli = Cli::parse_from([
            "usagetrace",
            "import",
            "--source",
            "Claude",
            "--from",
            "2025-06-01",
            "--to",
            "2025-06-30",
            "--purge",
            "--yes",
            "--pricing",
            "calculate",
        ]);
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.source, SourceSelector::One(SourceType::ClaudeCode));
        assert_eq!(args.from.map(|d| d.to_string()), Some("2025-06-01".to_string()));
        assert!(args.purge && args.yes);
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(Cli::try_parse_from(["usagetrace", "import", "--source", "cursor"]).is_err());
        assert!(Cli::try_parse_from(["usagetrace", "import", "--from", "06/01/2025"]).is_err());
        assert!(Cli::try_parse_from(["usagetrace", "import", "--pricing", "free"]).is_err());
    }

    #[test]
    fn test_state_clear_requires_source() {
        assert!(Cli::try_parse_from(["usagetrace", "state", "clear"]).is_err());
        let cli = Cli::parse_from(["usagetrace", "state", "clear", "--source", "gemini"]);
        assert!(matches!(
            cli.command,
            Commands::State {
                command: StateCommand::Clear {
                    source: SourceType::Gemini
                }
            }
        ));
    }
}
