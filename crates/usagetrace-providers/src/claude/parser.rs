use crate::builder::{RecordBuilder, attributes};
use crate::pricing::{PricingMode, TokenUsage};
use crate::{Error, Result};
use std::path::Path;
use tracing::{debug, warn};
use usagetrace_types::{ImportResult, SourceType, parse_timestamp};

use super::schema::{AssistantRecord, ClaudeRecord};

const SYNTHETIC_MODEL: &str = "<synthetic>";

/// Parse a Claude Code transcript into canonical records.
///
/// Each assistant line carries its own incremental usage, so lines are
/// independent. Lines that are not valid JSON are skipped; a file where no
/// line is valid is rejected.
pub(crate) fn parse_claude_file(path: &Path, pricing_mode: PricingMode) -> Result<ImportResult> {
    let text = std::fs::read_to_string(path)?;
    let mut builder = RecordBuilder::new(SourceType::ClaudeCode, path, pricing_mode);
    builder.set_session_id(session_id_from_path(path));

    let mut valid_lines = 0usize;
    let mut invalid_lines = 0usize;

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: ClaudeRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(err) => {
                warn!(path = %path.display(), line = idx + 1, error = %err, "skipping invalid line");
                invalid_lines += 1;
                continue;
            }
        };
        valid_lines += 1;

        if let Some(ts) = record.timestamp().and_then(parse_timestamp) {
            builder.observe(ts);
        }

        if let ClaudeRecord::Assistant(assistant) = record {
            push_assistant(&mut builder, &assistant, path, idx + 1);
        }
    }

    if valid_lines == 0 && invalid_lines > 0 {
        return Err(Error::parse(
            path,
            format!("no valid JSON lines ({invalid_lines} invalid)"),
        ));
    }

    let result = builder.finish();
    debug!(
        path = %path.display(),
        logs = result.logs.len(),
        metrics = result.metrics.len(),
        "parsed claude session"
    );
    Ok(result)
}

fn push_assistant(builder: &mut RecordBuilder, record: &AssistantRecord, path: &Path, line: usize) {
    let Some(ts) = parse_timestamp(&record.timestamp) else {
        warn!(path = %path.display(), line, timestamp = %record.timestamp, "skipping line with bad timestamp");
        return;
    };

    let model = record.message.model.as_deref().unwrap_or("unknown");
    let usage = record.message.usage.clone().unwrap_or_default();
    let tokens = TokenUsage {
        input: usage.input_tokens,
        output: usage.output_tokens,
        cache_creation: usage.cache_creation_input_tokens.unwrap_or(0),
        cache_read: usage.cache_read_input_tokens.unwrap_or(0),
        ..Default::default()
    };

    let input = tokens.input.to_string();
    let output = tokens.output.to_string();
    let cache_creation = tokens.cache_creation.to_string();
    let cache_read = tokens.cache_read.to_string();
    let cost = record.cost_usd.map(|c| c.to_string());
    let sidechain = record.is_sidechain.then_some("true");

    let attrs = attributes([
        ("model", Some(model)),
        ("request.id", record.request_id.as_deref()),
        ("message.id", record.message.id.as_deref()),
        ("cwd", record.cwd.as_deref()),
        ("app.version", record.version.as_deref()),
        ("git.branch", record.git_branch.as_deref()),
        ("input_tokens", Some(input.as_str())),
        ("output_tokens", Some(output.as_str())),
        ("cache_creation_tokens", Some(cache_creation.as_str())),
        ("cache_read_tokens", Some(cache_read.as_str())),
        ("cost_usd", cost.as_deref()),
        ("is_sidechain", sidechain),
    ]);

    builder.count_entry();

    // Error placeholders and synthetic turns never reached the API
    if record.is_api_error_message {
        builder.error_log(ts, "api_error", attrs);
        return;
    }
    builder.log(ts, "api_request", attrs);

    if model == SYNTHETIC_MODEL || record.message.usage.is_none() {
        return;
    }

    builder.usage(
        ts,
        model,
        &[
            ("input", tokens.input),
            ("output", tokens.output),
            ("cacheCreation", tokens.cache_creation),
            ("cacheRead", tokens.cache_read),
        ],
        &tokens,
        record.cost_usd,
    );
}

fn session_id_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_session(lines: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0f1e2d3c.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        (dir, path)
    }

    #[test]
    fn test_invalid_lines_are_skipped() {
        let (_dir, path) = write_session(&[
            r#"{"type":"user","timestamp":"2025-06-01T09:59:00Z","message":{"role":"user","content":"hi"}}"#,
            "{not json",
            r#"{"type":"assistant","timestamp":"2025-06-01T10:00:00Z","message":{"id":"msg_1","model":"claude-sonnet-4-20250514","usage":{"input_tokens":10,"output_tokens":5}}}"#,
        ]);

        let result = parse_claude_file(&path, PricingMode::Auto).unwrap();
        assert_eq!(result.session_id, "0f1e2d3c");
        assert_eq!(result.logs.len(), 1);
        assert_eq!(result.record_count, 1);
        // User line still widens the time range
        assert_eq!(result.first_time, parse_timestamp("2025-06-01T09:59:00Z"));
        assert_eq!(result.last_time, parse_timestamp("2025-06-01T10:00:00Z"));
    }

    #[test]
    fn test_all_invalid_is_parse_error() {
        let (_dir, path) = write_session(&["garbage", "{\"unterminated\":"]);
        let err = parse_claude_file(&path, PricingMode::Auto).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn test_api_error_and_synthetic_lines_emit_no_usage() {
        let (_dir, path) = write_session(&[
            r#"{"type":"assistant","timestamp":"2025-06-01T10:00:00Z","isApiErrorMessage":true,"message":{"model":"<synthetic>","usage":{"input_tokens":0,"output_tokens":0}}}"#,
            r#"{"type":"assistant","timestamp":"2025-06-01T10:01:00Z","message":{"model":"<synthetic>","usage":{"input_tokens":3,"output_tokens":3}}}"#,
        ]);

        let result = parse_claude_file(&path, PricingMode::Auto).unwrap();
        assert_eq!(result.logs.len(), 2);
        assert_eq!(result.logs[0].severity_text, "ERROR");
        assert_eq!(result.logs[0].body, "claude_code.api_error");
        assert!(result.metrics.is_empty());
    }

    #[test]
    fn test_calculate_mode_ignores_declared_cost() {
        let (_dir, path) = write_session(&[
            r#"{"type":"assistant","timestamp":"2025-06-01T10:00:00Z","costUSD":9.99,"message":{"model":"claude-sonnet-4-20250514","usage":{"input_tokens":1000000,"output_tokens":0}}}"#,
        ]);

        let result = parse_claude_file(&path, PricingMode::Calculate).unwrap();
        let cost = result
            .metrics
            .iter()
            .find(|m| m.metric_name == "claude_code.cost.usage")
            .unwrap();
        assert!((cost.value.unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(cost.attributes["cost.source"], "calculated");
    }
}
