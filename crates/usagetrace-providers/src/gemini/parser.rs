use crate::builder::{RecordBuilder, attributes};
use crate::pricing::{PricingMode, TokenUsage};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::debug;
use usagetrace_types::{ImportResult, SourceType, parse_timestamp};

use super::schema::{GeminiMessage, GeminiSession};

/// Parse one Gemini CLI session document.
///
/// Session id and time range come from the session header. `lastUpdated` is
/// the end of the session even when the last message is older.
pub(crate) fn parse_gemini_file(path: &Path, pricing_mode: PricingMode) -> Result<ImportResult> {
    let text = std::fs::read_to_string(path)?;
    let session: GeminiSession = serde_json::from_str(&text)
        .map_err(|err| Error::parse(path, format!("invalid session document: {err}")))?;

    let session_id = session
        .session_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::parse(path, "missing sessionId"))?;
    let start = required_time(path, "startTime", session.start_time.as_deref())?;
    let last_updated = required_time(path, "lastUpdated", session.last_updated.as_deref())?;

    let mut builder = RecordBuilder::new(SourceType::Gemini, path, pricing_mode);
    builder.set_session_id(session_id);

    for message in &session.messages {
        let ts = message
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(start);
        push_message(&mut builder, message, ts, session.project_hash.as_deref());
    }

    builder.set_time_range(start, last_updated);

    let result = builder.finish();
    debug!(
        path = %path.display(),
        messages = session.messages.len(),
        metrics = result.metrics.len(),
        "parsed gemini session"
    );
    Ok(result)
}

fn required_time(path: &Path, field: &str, value: Option<&str>) -> Result<DateTime<Utc>> {
    let value = value.ok_or_else(|| Error::parse(path, format!("missing {field}")))?;
    parse_timestamp(value)
        .ok_or_else(|| Error::parse(path, format!("invalid {field} '{value}'")))
}

fn push_message(
    builder: &mut RecordBuilder,
    message: &GeminiMessage,
    ts: DateTime<Utc>,
    project_hash: Option<&str>,
) {
    let length = message.content_length().to_string();
    let mut attrs = attributes([
        ("message.id", message.id.as_deref()),
        ("message.type", Some(message.kind.as_str())),
        ("project.hash", project_hash),
        ("model", message.model.as_deref()),
        ("content_length", Some(length.as_str())),
    ]);

    builder.count_entry();

    match message.kind.as_str() {
        "user" => builder.log(ts, "user_message", attrs),
        "info" => builder.log(ts, "info", attrs),
        "error" => builder.error_log(ts, "error", attrs),
        "gemini" => {
            let model = message.model.as_deref().unwrap_or("unknown");
            if let Some(tokens) = message.tokens {
                attrs.insert("input_tokens".to_string(), tokens.input.to_string());
                attrs.insert("output_tokens".to_string(), tokens.output.to_string());
                attrs.insert("cached_tokens".to_string(), tokens.cached.to_string());
                attrs.insert("thoughts_tokens".to_string(), tokens.thoughts.to_string());
                attrs.insert("tool_tokens".to_string(), tokens.tool.to_string());
            }
            builder.log(ts, "model_response", attrs);

            if let Some(tokens) = message.tokens {
                let usage = TokenUsage {
                    input: tokens.input,
                    output: tokens.output,
                    cache_read: tokens.cached,
                    reasoning: tokens.thoughts,
                    tool: tokens.tool,
                    ..Default::default()
                };
                builder.usage(
                    ts,
                    model,
                    &[
                        ("input", tokens.input),
                        ("output", tokens.output),
                        ("cached", tokens.cached),
                        ("thoughts", tokens.thoughts),
                        ("tool", tokens.tool),
                    ],
                    &usage,
                    None,
                );
            }
        }
        _ => builder.log(ts, "message", attrs),
    }
}
