use anyhow::Result;
use usagetrace_runtime::FileStateTracker;
use usagetrace_types::SourceType;

use crate::context::ExecutionContext;
use crate::output::{Palette, render_file_states};

pub fn list(ctx: &ExecutionContext, source: Option<SourceType>) -> Result<()> {
    let db = ctx.open_db()?;
    let states = FileStateTracker::new(&db).get_imported_files(source)?;
    print!("{}", render_file_states(&states, &Palette::detect()));
    Ok(())
}

pub fn clear(ctx: &ExecutionContext, source: SourceType) -> Result<()> {
    let db = ctx.open_db()?;
    let removed = FileStateTracker::new(&db).clear_source(source)?;
    println!(
        "Cleared {} file state(s) for {}; the next import reads them again.",
        removed, source
    );
    Ok(())
}
