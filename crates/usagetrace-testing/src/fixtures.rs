//! Session-log builders for the three on-disk formats.
//!
//! Each function returns one line (JSONL formats) or one document (Gemini),
//! shaped like what the real tools write.

use serde_json::{Value, json};

/// Token counts for a Claude Code assistant reply
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeTokens {
    pub input: i64,
    pub output: i64,
    pub cache_creation: i64,
    pub cache_read: i64,
}

impl ClaudeTokens {
    pub fn new(input: i64, output: i64) -> Self {
        Self {
            input,
            output,
            ..Default::default()
        }
    }
}

pub fn claude_user_line(timestamp: &str, text: &str) -> String {
    json!({
        "type": "user",
        "timestamp": timestamp,
        "cwd": "/home/dev/app",
        "message": {"role": "user", "content": text}
    })
    .to_string()
}

pub fn claude_assistant_line(
    timestamp: &str,
    model: &str,
    tokens: ClaudeTokens,
    cost_usd: Option<f64>,
) -> String {
    let mut line = json!({
        "type": "assistant",
        "timestamp": timestamp,
        "requestId": format!("req_{}", timestamp),
        "cwd": "/home/dev/app",
        "version": "1.0.72",
        "gitBranch": "main",
        "message": {
            "id": format!("msg_{}", timestamp),
            "type": "message",
            "role": "assistant",
            "model": model,
            "content": [{"type": "text", "text": "ok"}],
            "usage": {
                "input_tokens": tokens.input,
                "output_tokens": tokens.output,
                "cache_creation_input_tokens": tokens.cache_creation,
                "cache_read_input_tokens": tokens.cache_read
            }
        }
    });
    if let Some(cost) = cost_usd {
        line["costUSD"] = json!(cost);
    }
    line.to_string()
}

/// Two assistant replies costing 0.05 and 0.03 USD
pub fn claude_two_line_session() -> Vec<String> {
    vec![
        claude_assistant_line(
            "2025-06-01T10:00:05.000Z",
            "claude-sonnet-4-20250514",
            ClaudeTokens::new(1000, 500),
            Some(0.05),
        ),
        claude_assistant_line(
            "2025-06-01T10:01:10.000Z",
            "claude-sonnet-4-20250514",
            ClaudeTokens::new(800, 300),
            Some(0.03),
        ),
    ]
}

pub fn codex_session_meta(timestamp: &str, session_id: &str) -> String {
    json!({
        "timestamp": timestamp,
        "type": "session_meta",
        "payload": {
            "id": session_id,
            "timestamp": timestamp,
            "cwd": "/home/dev/app",
            "originator": "codex_cli_rs",
            "cli_version": "0.46.0",
            "model_provider": "openai"
        }
    })
    .to_string()
}

pub fn codex_turn_context(timestamp: &str, model: &str) -> String {
    json!({
        "timestamp": timestamp,
        "type": "turn_context",
        "payload": {"cwd": "/home/dev/app", "model": model}
    })
    .to_string()
}

pub fn codex_user_message(timestamp: &str, message: &str) -> String {
    json!({
        "timestamp": timestamp,
        "type": "event_msg",
        "payload": {"type": "user_message", "message": message, "images": []}
    })
    .to_string()
}

/// Cumulative usage snapshot: input, cached input, output, reasoning output
pub fn codex_token_count(timestamp: &str, input: i64, cached: i64, output: i64, reasoning: i64) -> String {
    json!({
        "timestamp": timestamp,
        "type": "event_msg",
        "payload": {
            "type": "token_count",
            "info": {
                "total_token_usage": {
                    "input_tokens": input,
                    "cached_input_tokens": cached,
                    "output_tokens": output,
                    "reasoning_output_tokens": reasoning,
                    "total_tokens": input + output
                },
                "model_context_window": 272000
            }
        }
    })
    .to_string()
}

/// Session with two cumulative snapshots, 500/50/200/10 then 800/100/350/20
pub fn codex_two_snapshot_session(session_id: &str) -> Vec<String> {
    vec![
        codex_session_meta("2025-06-01T10:00:00.000Z", session_id),
        codex_turn_context("2025-06-01T10:00:01.000Z", "gpt-5-codex"),
        codex_user_message("2025-06-01T10:00:02.000Z", "add a health check endpoint"),
        codex_token_count("2025-06-01T10:00:10.000Z", 500, 50, 200, 10),
        codex_token_count("2025-06-01T10:00:30.000Z", 800, 100, 350, 20),
    ]
}

pub fn gemini_user_message(id: &str, timestamp: &str, text: &str) -> Value {
    json!({"id": id, "timestamp": timestamp, "type": "user", "content": text})
}

/// Model reply with input, output, cached, thoughts and tool token counts
pub fn gemini_model_message(id: &str, timestamp: &str, model: &str, tokens: [i64; 5]) -> Value {
    let [input, output, cached, thoughts, tool] = tokens;
    json!({
        "id": id,
        "timestamp": timestamp,
        "type": "gemini",
        "content": "done",
        "model": model,
        "tokens": {
            "input": input,
            "output": output,
            "cached": cached,
            "thoughts": thoughts,
            "tool": tool,
            "total": input + output + thoughts + tool
        }
    })
}

pub fn gemini_session(session_id: &str, start: &str, last_updated: &str, messages: Vec<Value>) -> Value {
    json!({
        "sessionId": session_id,
        "projectHash": "5f1a9c",
        "startTime": start,
        "lastUpdated": last_updated,
        "messages": messages
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claude_line_omits_cost_when_absent() {
        let line: Value =
            serde_json::from_str(&claude_assistant_line("2025-06-01T10:00:00Z", "m", ClaudeTokens::new(1, 2), None))
                .unwrap();
        assert!(line.get("costUSD").is_none());
        assert_eq!(line["message"]["usage"]["output_tokens"], 2);
    }

    #[test]
    fn test_lines_are_single_line_json() {
        for line in codex_two_snapshot_session("s") {
            assert!(!line.contains('\n'));
        }
    }
}
