use serde::Deserialize;
use serde_json::Value;

/// Top-level rollout line. The payload is decoded per `type` once the
/// envelope itself is known to be well formed.
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct CodexEnvelope {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub(crate) struct SessionMetaPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub originator: Option<String>,
    #[serde(default)]
    pub cli_version: Option<String>,
    #[serde(default)]
    pub model_provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub git: Option<GitInfo>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub(crate) struct GitInfo {
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub commit_hash: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum EventMsgPayload {
    UserMessage(MessagePayload),
    AgentMessage(MessagePayload),
    TokenCount(TokenCountPayload),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub(crate) struct MessagePayload {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub(crate) struct TokenCountPayload {
    #[serde(default)]
    pub info: Option<TokenInfo>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct TokenInfo {
    pub total_token_usage: CodexUsage,
}

/// Running totals for the session so far
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CodexUsage {
    #[serde(default)]
    pub input_tokens: i64,
    #[serde(default)]
    pub cached_input_tokens: i64,
    #[serde(default)]
    pub output_tokens: i64,
    #[serde(default)]
    pub reasoning_output_tokens: i64,
}

impl CodexUsage {
    /// Per-field `self - previous`, clamped at zero for regressed fields
    pub fn delta_since(&self, previous: &CodexUsage) -> CodexUsage {
        CodexUsage {
            input_tokens: self.input_tokens.saturating_sub(previous.input_tokens).max(0),
            cached_input_tokens: self
                .cached_input_tokens
                .saturating_sub(previous.cached_input_tokens)
                .max(0),
            output_tokens: self.output_tokens.saturating_sub(previous.output_tokens).max(0),
            reasoning_output_tokens: self
                .reasoning_output_tokens
                .saturating_sub(previous.reasoning_output_tokens)
                .max(0),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == CodexUsage::default()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub(crate) struct TurnContextPayload {
    #[serde(default)]
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_saturates_on_extreme_values() {
        let previous = CodexUsage {
            input_tokens: i64::MIN,
            output_tokens: 10,
            ..Default::default()
        };
        let current = CodexUsage {
            input_tokens: i64::MAX,
            output_tokens: i64::MIN,
            ..Default::default()
        };

        let delta = current.delta_since(&previous);
        assert_eq!(delta.input_tokens, i64::MAX);
        assert_eq!(delta.output_tokens, 0);
        assert_eq!(delta.cached_input_tokens, 0);
    }
}
