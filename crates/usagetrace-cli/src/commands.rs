use anyhow::Result;
use usagetrace_runtime::resolve_workspace_path;

use super::args::{Cli, Commands, StateCommand};
use super::context::ExecutionContext;
use super::handlers;
use crate::logging;

pub fn run(cli: Cli) -> Result<()> {
    let verbose = matches!(&cli.command, Commands::Import(args) if args.verbose);
    logging::init(cli.log_level, verbose);

    let data_dir = resolve_workspace_path(cli.data_dir.as_deref())?;
    let ctx = ExecutionContext::load(data_dir)?;

    match cli.command {
        Commands::Import(args) => handlers::import::handle(&ctx, args),

        Commands::State { command } => match command {
            StateCommand::List { source } => handlers::state::list(&ctx, source),
            StateCommand::Clear { source } => handlers::state::clear(&ctx, source),
        },

        Commands::Sources => handlers::sources::handle(&ctx),
    }
}
