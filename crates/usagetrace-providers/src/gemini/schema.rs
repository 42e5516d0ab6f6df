use serde::Deserialize;
use serde_json::Value;

/// `session-*.json` under `<root>/<projectHash>/chats/`
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiSession {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub project_hash: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub messages: Vec<GeminiMessage>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct GeminiMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Plain text in most versions, a parts array in some
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub tokens: Option<GeminiTokens>,
}

impl GeminiMessage {
    pub fn content_length(&self) -> usize {
        match &self.content {
            Value::String(s) => s.chars().count(),
            Value::Array(parts) => parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .map(|t| t.chars().count())
                .sum(),
            _ => 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub(crate) struct GeminiTokens {
    #[serde(default)]
    pub input: i64,
    #[serde(default)]
    pub output: i64,
    #[serde(default)]
    pub cached: i64,
    #[serde(default)]
    pub thoughts: i64,
    #[serde(default)]
    pub tool: i64,
}
