use anyhow::Result;
use usagetrace_providers::get_all_sources;

use crate::context::ExecutionContext;
use crate::output::{Palette, SourceRow, render_sources};

pub fn handle(ctx: &ExecutionContext) -> Result<()> {
    let roots = ctx.roots();
    let rows: Vec<SourceRow> = get_all_sources()
        .iter()
        .map(|meta| SourceRow {
            name: meta.source.as_str(),
            description: meta.description,
            env_var: meta.env_var,
            root: roots.get(meta.source).to_path_buf(),
            enabled: ctx.config().is_enabled(meta.source),
        })
        .collect();

    print!("{}", render_sources(&rows, &Palette::detect()));
    println!("Data directory: {}", ctx.data_dir().display());
    Ok(())
}
