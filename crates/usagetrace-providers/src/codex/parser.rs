use crate::builder::{RecordBuilder, attributes};
use crate::discovery::file_name;
use crate::pricing::{PricingMode, TokenUsage};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};
use usagetrace_types::{ImportResult, SourceType, parse_timestamp};

use super::schema::{
    CodexEnvelope, CodexUsage, EventMsgPayload, SessionMetaPayload, TurnContextPayload,
};

static TRAILING_UUID: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})$")
        .ok()
});

const UNKNOWN_MODEL: &str = "unknown";

/// Per-file fold state. Lives only for one `parse_codex_file` call.
#[derive(Default)]
struct RolloutState {
    previous: CodexUsage,
    turn_model: Option<String>,
    meta_model: Option<String>,
}

impl RolloutState {
    fn model(&self) -> &str {
        self.turn_model
            .as_deref()
            .or(self.meta_model.as_deref())
            .unwrap_or(UNKNOWN_MODEL)
    }
}

/// Parse a Codex rollout into canonical records.
///
/// `token_count` events report running totals, so each one is diffed against
/// the previous snapshot in this file. Every line must be a valid envelope.
pub(crate) fn parse_codex_file(path: &Path, pricing_mode: PricingMode) -> Result<ImportResult> {
    let text = std::fs::read_to_string(path)?;
    let mut builder = RecordBuilder::new(SourceType::Codex, path, pricing_mode);
    let mut state = RolloutState::default();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let envelope: CodexEnvelope = serde_json::from_str(line)
            .map_err(|err| Error::parse(path, format!("line {}: {err}", idx + 1)))?;

        let ts = envelope.timestamp.as_deref().and_then(parse_timestamp);
        if let Some(ts) = ts {
            builder.observe(ts);
        }

        apply_envelope(&mut builder, &mut state, envelope, ts, path, idx + 1);
    }

    if !builder.has_session_id() {
        builder.set_session_id(session_id_from_path(path));
    }

    let result = builder.finish();
    debug!(
        path = %path.display(),
        logs = result.logs.len(),
        metrics = result.metrics.len(),
        "parsed codex rollout"
    );
    Ok(result)
}

fn apply_envelope(
    builder: &mut RecordBuilder,
    state: &mut RolloutState,
    envelope: CodexEnvelope,
    ts: Option<DateTime<Utc>>,
    path: &Path,
    line: usize,
) {
    match envelope.kind.as_str() {
        "session_meta" => {
            let Some(meta) = decode::<SessionMetaPayload>(envelope.payload, path, line) else {
                return;
            };
            if let Some(id) = meta.id.as_deref().filter(|id| !id.is_empty()) {
                builder.set_session_id(id);
            }
            if meta.model.is_some() {
                state.meta_model = meta.model.clone();
            }
            let Some(ts) = require_timestamp(ts, path, line) else {
                return;
            };
            let git = meta.git.unwrap_or_default();
            let attrs = attributes([
                ("cwd", meta.cwd.as_deref()),
                ("originator", meta.originator.as_deref()),
                ("app.version", meta.cli_version.as_deref()),
                ("model_provider", meta.model_provider.as_deref()),
                ("model", meta.model.as_deref()),
                ("git.branch", git.branch.as_deref()),
                ("git.commit", git.commit_hash.as_deref()),
            ]);
            builder.count_entry();
            builder.log(ts, "session_start", attrs);
        }
        "turn_context" => {
            if let Some(ctx) = decode::<TurnContextPayload>(envelope.payload, path, line)
                && let Some(model) = ctx.model.filter(|m| !m.is_empty())
            {
                state.turn_model = Some(model);
            }
        }
        "event_msg" => {
            let Some(event) = decode::<EventMsgPayload>(envelope.payload, path, line) else {
                return;
            };
            apply_event(builder, state, event, ts, path, line);
        }
        _ => {}
    }
}

fn apply_event(
    builder: &mut RecordBuilder,
    state: &mut RolloutState,
    event: EventMsgPayload,
    ts: Option<DateTime<Utc>>,
    path: &Path,
    line: usize,
) {
    match event {
        EventMsgPayload::UserMessage(msg) => {
            let Some(ts) = require_timestamp(ts, path, line) else {
                return;
            };
            let length = msg.message.chars().count().to_string();
            builder.count_entry();
            builder.log(ts, "user_prompt", attributes([("prompt_length", Some(length.as_str()))]));
        }
        EventMsgPayload::AgentMessage(msg) => {
            let Some(ts) = require_timestamp(ts, path, line) else {
                return;
            };
            let length = msg.message.chars().count().to_string();
            builder.count_entry();
            builder.log(
                ts,
                "agent_message",
                attributes([("message_length", Some(length.as_str()))]),
            );
        }
        EventMsgPayload::TokenCount(payload) => {
            let Some(info) = payload.info else {
                return;
            };
            let current = info.total_token_usage;
            let delta = current.delta_since(&state.previous);
            state.previous = current;

            if delta.is_zero() {
                return;
            }
            let Some(ts) = require_timestamp(ts, path, line) else {
                return;
            };

            let usage = TokenUsage {
                input: delta.input_tokens,
                output: delta.output_tokens,
                cache_read: delta.cached_input_tokens,
                reasoning: delta.reasoning_output_tokens,
                ..Default::default()
            };
            let model = state.model().to_string();
            builder.count_entry();
            builder.usage(
                ts,
                &model,
                &[
                    ("input", delta.input_tokens),
                    ("cachedInput", delta.cached_input_tokens),
                    ("output", delta.output_tokens),
                    ("reasoningOutput", delta.reasoning_output_tokens),
                ],
                &usage,
                None,
            );
        }
        EventMsgPayload::Unknown => {}
    }
}

fn decode<T: DeserializeOwned>(payload: serde_json::Value, path: &Path, line: usize) -> Option<T> {
    match serde_json::from_value(payload) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(path = %path.display(), line, error = %err, "skipping unreadable payload");
            None
        }
    }
}

fn require_timestamp(ts: Option<DateTime<Utc>>, path: &Path, line: usize) -> Option<DateTime<Utc>> {
    if ts.is_none() {
        warn!(path = %path.display(), line, "skipping event without timestamp");
    }
    ts
}

/// UUID at the end of `rollout-<timestamp>-<uuid>.jsonl`, else the stem
fn session_id_from_path(path: &Path) -> String {
    let stem = file_name(path).trim_end_matches(".jsonl");
    TRAILING_UUID
        .as_ref()
        .and_then(|re| re.captures(stem))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_rollout(name: &str, body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        (dir, path)
    }

    fn token_metrics(result: &ImportResult, kind: &str) -> Vec<f64> {
        result
            .metrics
            .iter()
            .filter(|m| m.metric_name == "codex.token.usage" && m.attributes["type"] == kind)
            .filter_map(|m| m.value)
            .collect()
    }

    #[test]
    fn test_session_id_falls_back_to_trailing_uuid() {
        let path = Path::new(
            "/s/2025/06/01/rollout-2025-06-01T10-00-00-0197a3b2-1c4d-7e8f-9a0b-1c2d3e4f5a6b.jsonl",
        );
        assert_eq!(session_id_from_path(path), "0197a3b2-1c4d-7e8f-9a0b-1c2d3e4f5a6b");
        assert_eq!(session_id_from_path(Path::new("/s/rollout-abc.jsonl")), "rollout-abc");
    }

    #[test]
    fn test_regressed_fields_clamp_to_zero() {
        let body = concat!(
            r#"{"timestamp":"2025-06-01T10:00:00Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":500,"output_tokens":200}}}}"#,
            "\n",
            r#"{"timestamp":"2025-06-01T10:01:00Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":400,"output_tokens":260}}}}"#,
            "\n",
        );
        let (_dir, path) = write_rollout("rollout-x.jsonl", body);
        let result = parse_codex_file(&path, PricingMode::Auto).unwrap();

        assert_eq!(token_metrics(&result, "input"), vec![500.0]);
        assert_eq!(token_metrics(&result, "output"), vec![200.0, 60.0]);
        assert_eq!(result.record_count, 2);
    }

    #[test]
    fn test_null_info_and_repeated_snapshots_produce_nothing() {
        let body = concat!(
            r#"{"timestamp":"2025-06-01T10:00:00Z","type":"event_msg","payload":{"type":"token_count","info":null}}"#,
            "\n",
            r#"{"timestamp":"2025-06-01T10:01:00Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":5}}}}"#,
            "\n",
            r#"{"timestamp":"2025-06-01T10:02:00Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":5}}}}"#,
            "\n",
        );
        let (_dir, path) = write_rollout("rollout-y.jsonl", body);
        let result = parse_codex_file(&path, PricingMode::Auto).unwrap();

        assert_eq!(result.record_count, 1);
        assert_eq!(token_metrics(&result, "input"), vec![5.0]);
        assert_eq!(result.last_time, parse_timestamp("2025-06-01T10:02:00Z"));
    }

    #[test]
    fn test_turn_context_model_prices_following_usage() {
        let body = concat!(
            r#"{"timestamp":"2025-06-01T10:00:00Z","type":"turn_context","payload":{"model":"gpt-5"}}"#,
            "\n",
            r#"{"timestamp":"2025-06-01T10:01:00Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":1000000}}}}"#,
            "\n",
        );
        let (_dir, path) = write_rollout("rollout-z.jsonl", body);
        let result = parse_codex_file(&path, PricingMode::Auto).unwrap();

        let cost = result
            .metrics
            .iter()
            .find(|m| m.metric_name == "codex.cost.usage")
            .unwrap();
        assert_eq!(cost.attributes["model"], "gpt-5");
        assert!((cost.value.unwrap() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_line_fails_the_file() {
        let body = "{\"timestamp\":\"2025-06-01T10:00:00Z\",\"type\":\"session_meta\",\"payload\":{}}\nnot json\n";
        let (_dir, path) = write_rollout("rollout-bad.jsonl", body);
        let err = parse_codex_file(&path, PricingMode::Auto).unwrap_err();
        assert!(err.to_string().contains("line 2"), "got {err}");
    }
}
