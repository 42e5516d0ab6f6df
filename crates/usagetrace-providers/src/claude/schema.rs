use serde::Deserialize;

/// One line of a Claude Code session transcript
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ClaudeRecord {
    User(TimestampedRecord),
    System(TimestampedRecord),
    Assistant(Box<AssistantRecord>),
    #[serde(other)]
    Unknown,
}

impl ClaudeRecord {
    pub fn timestamp(&self) -> Option<&str> {
        match self {
            ClaudeRecord::User(r) | ClaudeRecord::System(r) => r.timestamp.as_deref(),
            ClaudeRecord::Assistant(r) => Some(r.timestamp.as_str()),
            ClaudeRecord::Unknown => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct TimestampedRecord {
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssistantRecord {
    pub timestamp: String,
    pub message: AssistantMessage,
    #[serde(default, rename = "costUSD")]
    pub cost_usd: Option<f64>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub is_api_error_message: bool,
    #[serde(default)]
    pub is_sidechain: bool,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct AssistantMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<ClaudeUsage>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub(crate) struct ClaudeUsage {
    #[serde(default)]
    pub input_tokens: i64,
    #[serde(default)]
    pub output_tokens: i64,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<i64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<i64>,
}
