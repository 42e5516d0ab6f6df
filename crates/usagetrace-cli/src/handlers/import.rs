use anyhow::Result;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;
use usagetrace_runtime::{ImportOptions, ImportOutcome, ImportService};

use crate::args::ImportArgs;
use crate::context::ExecutionContext;
use crate::output::{Palette, render_banner, render_progress, render_result, render_summary};

pub fn handle(ctx: &ExecutionContext, args: ImportArgs) -> Result<()> {
    let options = ImportOptions {
        selector: args.source,
        from: args.from,
        to: args.to,
        dry_run: args.dry_run,
        force: args.force,
        purge: args.purge,
        skip_confirm: args.yes,
    };
    options.validate()?;

    let pricing_mode = ctx.config().pricing_mode(args.pricing);
    let registry = ctx.registry(pricing_mode);
    let db = ctx.open_db()?;
    let palette = Palette::detect();
    let verbose = args.verbose;

    if let Some(banner) = render_banner(&options, &palette) {
        println!("{}", banner);
    }

    let cancel = Arc::new(AtomicBool::new(false));
    install_interrupt_handler(cancel.clone());

    let mut summary_shown = false;
    let outcome = ImportService::new(&db, &db, &registry)
        .with_cancel_flag(cancel)
        .run(
            &options,
            |event| {
                if verbose && let Some(line) = render_progress(&event) {
                    eprintln!("{}", line);
                }
            },
            |summary| {
                print!("{}", render_summary(summary, verbose, &palette));
                summary_shown = true;
                confirm_import()
            },
        )?;

    match outcome {
        ImportOutcome::DryRun(summary) => {
            print!("{}", render_summary(&summary, verbose, &palette));
            println!("Dry run: nothing was written.");
        }
        ImportOutcome::NothingToImport(summary) => {
            if verbose || summary.has_errors() {
                print!("{}", render_summary(&summary, verbose, &palette));
            }
            println!("Nothing to import.");
        }
        ImportOutcome::Declined(_) => {
            println!("Import declined; nothing was written.");
        }
        ImportOutcome::Imported(summary) => {
            if !summary_shown {
                print!("{}", render_summary(&summary, verbose, &palette));
            }
            println!("{}", render_result(&summary, &palette));
        }
    }

    Ok(())
}

/// First Ctrl-C stops the import at the next file; a second one exits at once
fn install_interrupt_handler(flag: Arc<AtomicBool>) {
    let result = ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        eprintln!("Interrupted; stopping before the next file (Ctrl-C again to quit)");
    });
    if let Err(e) = result {
        warn!(error = %e, "could not install Ctrl-C handler");
    }
}

/// Ask on stderr, read the answer from stdin. No answer means no.
fn confirm_import() -> bool {
    eprint!("Proceed with import? [y/N] ");
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_yes(&answer),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
