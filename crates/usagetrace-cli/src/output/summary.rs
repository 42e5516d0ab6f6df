use usagetrace_runtime::{FileStatus, ImportOptions, ImportProgress, ImportSummary, RecordCounts};

use super::Palette;

/// Mode line printed before any work starts, so destructive modes are never silent
pub fn render_banner(options: &ImportOptions, palette: &Palette) -> Option<String> {
    let mut tags = Vec::new();
    if options.dry_run {
        tags.push(palette.yellow("DRY RUN: nothing will be written"));
    }
    if options.purge {
        tags.push(palette.red(&format!(
            "PURGE: stored records for {} in {} will be replaced",
            options.selector,
            describe_range(options)
        )));
    }
    if tags.is_empty() { None } else { Some(tags.join("\n")) }
}

fn describe_range(options: &ImportOptions) -> String {
    match (options.from, options.to) {
        (None, None) => "all time".to_string(),
        (Some(from), None) => format!("{} onwards", from),
        (None, Some(to)) => format!("everything up to {}", to),
        (Some(from), Some(to)) => format!("{}..{}", from, to),
    }
}

fn counts(c: &RecordCounts) -> String {
    format!("{} logs, {} metrics, {} spans", c.logs, c.metrics, c.spans)
}

pub fn render_summary(summary: &ImportSummary, verbose: bool, palette: &Palette) -> String {
    let mut lines = Vec::new();

    lines.push(palette.bold("Sources"));
    for (source, s) in &summary.sources {
        lines.push(format!(
            "  {:<12} {} new, {} modified, {} forced, {} skipped, {} filtered, {} failed  ({})",
            source.as_str(),
            s.new_files,
            s.modified_files,
            s.forced_files,
            s.skipped_files,
            s.filtered_files,
            s.failed_files,
            counts(&RecordCounts {
                logs: s.logs,
                metrics: s.metrics,
                spans: s.spans,
            })
        ));
    }
    for source in &summary.skipped_sources {
        lines.push(format!("  {:<12} {}", source.as_str(), palette.dim("no parser, skipped")));
    }

    lines.push(format!(
        "{} {} file(s), {}",
        palette.bold("Total:"),
        summary.total_files_imported(),
        counts(&summary.totals())
    ));

    if let Some(purged) = &summary.purged {
        let verb = if summary.dry_run { "would delete" } else { "deleted" };
        lines.push(format!("{} {} {}", palette.bold("Purge:"), verb, counts(purged)));
    }

    if verbose && !summary.files.is_empty() {
        lines.push(palette.bold("Files"));
        for file in summary.files_sorted() {
            let status = match file.status {
                FileStatus::New => palette.green("new"),
                FileStatus::Modified => palette.yellow("modified"),
                FileStatus::Current => palette.dim("forced"),
            };
            lines.push(format!(
                "  {:<8} {}  session {}, {} record(s), {}",
                status,
                file.path.display(),
                file.session_id,
                file.record_count,
                counts(&RecordCounts {
                    logs: file.logs,
                    metrics: file.metrics,
                    spans: file.spans,
                })
            ));
        }
    }

    if summary.has_errors() {
        lines.push(palette.red("Errors"));
        for err in &summary.source_errors {
            lines.push(format!("  {:<12} {}", err.source.as_str(), err.message));
        }
        for err in summary.errors_sorted() {
            lines.push(format!("  {:<12} {}: {}", err.source.as_str(), err.path.display(), err.message));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Closing line of a run that wrote to the store
pub fn render_result(summary: &ImportSummary, palette: &Palette) -> String {
    palette.green(&format!(
        "Imported {} from {} file(s).",
        counts(&summary.totals()),
        summary.total_files_imported()
    ))
}

/// One line per progress event, for `--verbose`
pub fn render_progress(event: &ImportProgress) -> Option<String> {
    let line = match event {
        ImportProgress::SourceStarted { source } => format!("[{}] scanning", source),
        ImportProgress::SourceSkipped { source, reason } => format!("[{}] skipped: {}", source, reason),
        ImportProgress::RootMissing { source, root } => {
            format!("[{}] log root not found: {}", source, root.display())
        }
        ImportProgress::SourceFailed { source, message } => format!("[{}] discovery failed: {}", source, message),
        ImportProgress::FilesDiscovered { source, count, eligible } => {
            format!("[{}] {} file(s), {} to import", source, count, eligible)
        }
        ImportProgress::FileSkipped { .. } => return None,
        ImportProgress::FileFiltered { source, path } => {
            format!("[{}] outside date range: {}", source, path.display())
        }
        ImportProgress::FileParsed {
            source,
            path,
            status,
            records,
        } => format!("[{}] {} {} ({})", source, status, path.display(), counts(records)),
        ImportProgress::FileFailed { source, path, message } => {
            format!("[{}] failed {}: {}", source, path.display(), message)
        }
        ImportProgress::Purging { services, dry_run } => {
            let verb = if *dry_run { "counting" } else { "purging" };
            format!("{} stored records for {}", verb, services.join(", "))
        }
        ImportProgress::Writing { records } => format!("writing {}", counts(records)),
        ImportProgress::Completed { records, files } => {
            format!("done: {} from {} file(s)", counts(records), files)
        }
    };
    Some(line)
}
