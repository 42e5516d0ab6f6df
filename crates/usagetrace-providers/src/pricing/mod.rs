//! Cost calculation from token usage.
//!
//! Stateless: a built-in rate table plus pure functions. Callers decide how a
//! computed cost combines with a cost the source already declared via
//! [`PricingMode`].

mod rates;

pub use rates::{ModelRates, lookup_rates};

use crate::Error;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use usagetrace_types::SourceType;

/// Token counts for one usage event.
///
/// Signed so that regressions in source data can be detected and clamped
/// rather than wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: i64,
    pub output: i64,
    pub cache_creation: i64,
    pub cache_read: i64,
    pub reasoning: i64,
    pub tool: i64,
}

impl TokenUsage {
    /// Copy with every count clamped to be non-negative
    pub fn clamped(&self) -> Self {
        Self {
            input: self.input.max(0),
            output: self.output.max(0),
            cache_creation: self.cache_creation.max(0),
            cache_read: self.cache_read.max(0),
            reasoning: self.reasoning.max(0),
            tool: self.tool.max(0),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// How the cost metric of a usage event is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingMode {
    /// Declared cost when positive, otherwise computed, otherwise zero
    #[default]
    Auto,
    /// Always compute from tokens
    Calculate,
    /// Always use the declared cost
    Display,
}

impl fmt::Display for PricingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingMode::Auto => write!(f, "auto"),
            PricingMode::Calculate => write!(f, "calculate"),
            PricingMode::Display => write!(f, "display"),
        }
    }
}

impl FromStr for PricingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(PricingMode::Auto),
            "calculate" => Ok(PricingMode::Calculate),
            "display" => Ok(PricingMode::Display),
            _ => Err(Error::UnknownPricingMode(s.to_string())),
        }
    }
}

/// Where a resolved cost came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostOrigin {
    Declared,
    Calculated,
    None,
}

impl CostOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostOrigin::Declared => "declared",
            CostOrigin::Calculated => "calculated",
            CostOrigin::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostResolution {
    pub amount: f64,
    pub origin: CostOrigin,
}

impl CostResolution {
    fn none() -> Self {
        Self {
            amount: 0.0,
            origin: CostOrigin::None,
        }
    }
}

/// Pick the cost to report for one usage event
pub fn resolve_cost(mode: PricingMode, declared: Option<f64>, computed: Option<f64>) -> CostResolution {
    let declared_cost = declared.map(|amount| CostResolution {
        amount,
        origin: CostOrigin::Declared,
    });
    let computed_cost = computed.map(|amount| CostResolution {
        amount,
        origin: CostOrigin::Calculated,
    });

    match mode {
        PricingMode::Auto => declared_cost
            .filter(|c| c.amount > 0.0)
            .or(computed_cost)
            .unwrap_or_else(CostResolution::none),
        PricingMode::Calculate => computed_cost.unwrap_or_else(CostResolution::none),
        PricingMode::Display => declared_cost.unwrap_or_else(CostResolution::none),
    }
}

static BEDROCK_VERSION_SUFFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"-v\d+(:\d+)?$").ok());
static VERTEX_DATE_SUFFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"@\d{8}$").ok());

fn provider_prefixes(source: SourceType) -> &'static [&'static str] {
    match source {
        SourceType::ClaudeCode => &[
            "anthropic/",
            "bedrock/",
            "vertex_ai/",
            "us.anthropic.",
            "eu.anthropic.",
            "apac.anthropic.",
            "global.anthropic.",
            "anthropic.",
        ],
        SourceType::Codex => &["openai/", "azure/"],
        SourceType::Gemini => &["google/", "vertex_ai/", "gemini/", "models/"],
    }
}

/// Canonical rate-table key for a model name as the source tool reports it
pub fn normalize_model_name(source: SourceType, raw: &str) -> String {
    let mut name = raw.trim().to_ascii_lowercase();

    // Prefixes can stack, e.g. "bedrock/us.anthropic.claude-..."
    loop {
        let stripped = provider_prefixes(source)
            .iter()
            .find_map(|prefix| name.strip_prefix(prefix).map(str::to_string));
        match stripped {
            Some(rest) => name = rest,
            None => break,
        }
    }

    for suffix in [&*BEDROCK_VERSION_SUFFIX, &*VERTEX_DATE_SUFFIX].into_iter().flatten() {
        name = suffix.replace(&name, "").into_owned();
    }

    name
}

/// Compute the cost of `usage` for `model`, or `None` if the model is unrated.
///
/// Claude reports cache reads separately from input. Codex and Gemini count
/// cached tokens inside `input`, so the cached share is clamped to `input`
/// and only the remainder is billed at the base input rate.
pub fn calculate_cost(source: SourceType, model: &str, usage: &TokenUsage) -> Option<f64> {
    let rates = lookup_rates(&normalize_model_name(source, model))?;
    let u = usage.clamped();

    let cost = match source {
        SourceType::ClaudeCode => {
            rates.input_cost(u.input)
                + rates.output_cost(u.output)
                + rates.cache_write_cost(u.cache_creation)
                + rates.cache_read_cost(u.cache_read)
        }
        // `output_tokens` already includes reasoning, so `reasoning` is not billed again
        SourceType::Codex => {
            let cached = u.cache_read.min(u.input);
            rates.input_cost(u.input - cached)
                + rates.cache_read_cost(cached)
                + rates.output_cost(u.output)
        }
        SourceType::Gemini => {
            let cached = u.cache_read.min(u.input);
            rates.input_cost((u.input - cached).saturating_add(u.tool))
                + rates.cache_read_cost(cached)
                + rates.output_cost(u.output.saturating_add(u.reasoning))
        }
    };

    Some(cost)
}
