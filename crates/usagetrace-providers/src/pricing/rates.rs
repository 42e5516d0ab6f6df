/// USD per million tokens for one model family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRates {
    pub model: &'static str,
    pub input: f64,
    pub output: f64,
    pub cache_write: f64,
    pub cache_read: f64,
}

const PER_MILLION: f64 = 1_000_000.0;

impl ModelRates {
    pub const fn new(
        model: &'static str,
        input: f64,
        output: f64,
        cache_write: f64,
        cache_read: f64,
    ) -> Self {
        Self {
            model,
            input,
            output,
            cache_write,
            cache_read,
        }
    }

    pub fn input_cost(&self, tokens: i64) -> f64 {
        tokens as f64 * self.input / PER_MILLION
    }

    pub fn output_cost(&self, tokens: i64) -> f64 {
        tokens as f64 * self.output / PER_MILLION
    }

    pub fn cache_write_cost(&self, tokens: i64) -> f64 {
        tokens as f64 * self.cache_write / PER_MILLION
    }

    pub fn cache_read_cost(&self, tokens: i64) -> f64 {
        tokens as f64 * self.cache_read / PER_MILLION
    }
}

// Keys are normalized model names. Dated variants resolve by prefix.
const RATES: &[ModelRates] = &[
    // Anthropic (as of 2025-11)
    ModelRates::new("claude-opus-4-5", 5.0, 25.0, 6.25, 0.5),
    ModelRates::new("claude-opus-4-1", 15.0, 75.0, 18.75, 1.5),
    ModelRates::new("claude-opus-4", 15.0, 75.0, 18.75, 1.5),
    ModelRates::new("claude-sonnet-4-5", 3.0, 15.0, 3.75, 0.3),
    ModelRates::new("claude-sonnet-4", 3.0, 15.0, 3.75, 0.3),
    ModelRates::new("claude-haiku-4-5", 1.0, 5.0, 1.25, 0.1),
    ModelRates::new("claude-3-7-sonnet", 3.0, 15.0, 3.75, 0.3),
    ModelRates::new("claude-3-5-sonnet", 3.0, 15.0, 3.75, 0.3),
    ModelRates::new("claude-3-5-haiku", 0.8, 4.0, 1.0, 0.08),
    ModelRates::new("claude-3-opus", 15.0, 75.0, 18.75, 1.5),
    // OpenAI
    ModelRates::new("gpt-5", 1.25, 10.0, 0.0, 0.125),
    ModelRates::new("gpt-5-codex", 1.25, 10.0, 0.0, 0.125),
    ModelRates::new("gpt-5.1", 1.25, 10.0, 0.0, 0.125),
    ModelRates::new("gpt-5.1-codex", 1.25, 10.0, 0.0, 0.125),
    ModelRates::new("gpt-5.2", 1.75, 14.0, 0.0, 0.175),
    ModelRates::new("gpt-5.2-codex", 1.75, 14.0, 0.0, 0.175),
    ModelRates::new("gpt-5-mini", 0.25, 2.0, 0.0, 0.025),
    ModelRates::new("gpt-5-nano", 0.05, 0.4, 0.0, 0.005),
    ModelRates::new("gpt-4.1", 2.0, 8.0, 0.0, 0.5),
    ModelRates::new("gpt-4o", 2.5, 10.0, 0.0, 1.25),
    ModelRates::new("o3", 2.0, 8.0, 0.0, 0.5),
    ModelRates::new("o3-mini", 1.1, 4.4, 0.0, 0.55),
    ModelRates::new("o4-mini", 1.1, 4.4, 0.0, 0.275),
    ModelRates::new("codex-mini-latest", 1.5, 6.0, 0.0, 0.375),
    // Google
    ModelRates::new("gemini-3-pro-preview", 2.0, 12.0, 0.0, 0.2),
    ModelRates::new("gemini-2.5-pro", 1.25, 10.0, 0.0, 0.3125),
    ModelRates::new("gemini-2.5-flash", 0.3, 2.5, 0.0, 0.075),
    ModelRates::new("gemini-2.5-flash-lite", 0.1, 0.4, 0.0, 0.025),
    ModelRates::new("gemini-2.0-flash", 0.1, 0.4, 0.0, 0.025),
];

/// Find rates for a normalized model name.
///
/// Exact match first, then the longest table key that is a prefix of `model`
/// ending on a `-` boundary, so "claude-sonnet-4-20250514" resolves to
/// "claude-sonnet-4" but "gpt-5.1" never falls back to "gpt-5".
pub fn lookup_rates(model: &str) -> Option<&'static ModelRates> {
    if let Some(exact) = RATES.iter().find(|r| r.model == model) {
        return Some(exact);
    }

    RATES
        .iter()
        .filter(|r| {
            model
                .strip_prefix(r.model)
                .is_some_and(|rest| rest.starts_with('-'))
        })
        .max_by_key(|r| r.model.len())
}
