use crate::pricing::{PricingMode, TokenUsage, calculate_cost, resolve_cost};
use chrono::{DateTime, Utc};
use std::path::Path;
use usagetrace_types::{Attributes, ImportResult, LogRecord, MetricDataPoint, SourceType};

pub(crate) const SESSION_ID_ATTR: &str = "session.id";

/// Accumulates the canonical records produced from one session file.
///
/// Owned by a single `parse_file` call. The session id is stamped onto every
/// record in [`RecordBuilder::finish`] because some formats only reveal it
/// after the first records have been built.
pub(crate) struct RecordBuilder {
    source: SourceType,
    pricing_mode: PricingMode,
    result: ImportResult,
}

impl RecordBuilder {
    pub fn new(source: SourceType, path: &Path, pricing_mode: PricingMode) -> Self {
        Self {
            source,
            pricing_mode,
            result: ImportResult::new(path, ""),
        }
    }

    pub fn set_session_id(&mut self, session_id: impl Into<String>) {
        self.result.session_id = session_id.into();
    }

    pub fn has_session_id(&self) -> bool {
        !self.result.session_id.is_empty()
    }

    pub fn observe(&mut self, ts: DateTime<Utc>) {
        self.result.observe_time(ts);
    }

    /// Override the session time range with authoritative values
    pub fn set_time_range(&mut self, first: DateTime<Utc>, last: DateTime<Utc>) {
        self.result.first_time = Some(first);
        self.result.last_time = Some(last);
    }

    /// Count one source entry that produced records
    pub fn count_entry(&mut self) {
        self.result.record_count += 1;
    }

    /// Push an INFO log whose body is `<prefix>.<event>`
    pub fn log(&mut self, ts: DateTime<Utc>, event: &str, attributes: Attributes) {
        let mut record = LogRecord::info(ts, self.source.service_name(), self.body(event));
        record.log_attributes = attributes;
        self.push_log(record);
    }

    pub fn error_log(&mut self, ts: DateTime<Utc>, event: &str, attributes: Attributes) {
        let mut record = LogRecord::info(ts, self.source.service_name(), self.body(event));
        record.severity_text = "ERROR".to_string();
        record.severity_number = 17;
        record.log_attributes = attributes;
        self.push_log(record);
    }

    /// Emit one token metric per non-zero category, then one cost metric.
    ///
    /// `categories` pairs the `type` attribute value with the count to report;
    /// `usage` is what gets priced.
    pub fn usage(
        &mut self,
        ts: DateTime<Utc>,
        model: &str,
        categories: &[(&str, i64)],
        usage: &TokenUsage,
        declared_cost: Option<f64>,
    ) {
        let service = self.source.service_name();
        let token_metric = format!("{}.token.usage", self.source.metric_prefix());
        let cost_metric = format!("{}.cost.usage", self.source.metric_prefix());

        for (kind, count) in categories.iter().filter(|(_, count)| *count > 0) {
            let point = MetricDataPoint::delta_sum(ts, service, &token_metric, "tokens", *count as f64)
                .with_description("Number of tokens used")
                .with_attribute("type", *kind)
                .with_attribute("model", model);
            self.result.metrics.push(point);
        }

        let computed = calculate_cost(self.source, model, usage);
        let cost = resolve_cost(self.pricing_mode, declared_cost, computed);
        let point = MetricDataPoint::delta_sum(ts, service, &cost_metric, "USD", cost.amount)
            .with_description("Cost of the session in USD")
            .with_attribute("model", model)
            .with_attribute("cost.source", cost.origin.as_str());
        self.result.metrics.push(point);
        self.observe(ts);
    }

    pub fn finish(mut self) -> ImportResult {
        let session_id = self.result.session_id.clone();
        for log in &mut self.result.logs {
            log.log_attributes
                .insert(SESSION_ID_ATTR.to_string(), session_id.clone());
        }
        for metric in &mut self.result.metrics {
            metric
                .attributes
                .insert(SESSION_ID_ATTR.to_string(), session_id.clone());
        }
        self.result
    }

    fn body(&self, event: &str) -> String {
        format!("{}.{}", self.source.metric_prefix(), event)
    }

    fn push_log(&mut self, mut record: LogRecord) {
        record
            .resource_attributes
            .insert("service.name".to_string(), self.source.service_name().to_string());
        record.scope_name = format!("{}.import", self.source.metric_prefix());
        self.observe(record.timestamp);
        self.result.logs.push(record);
    }
}

/// Attribute map from the `Some` entries of `pairs`
pub(crate) fn attributes<'a, I>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    pairs
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_usage_skips_zero_categories_and_stamps_session() {
        let ts = Utc.with_ymd_and_hms(2025, 5, 1, 10, 0, 0).unwrap();
        let mut builder = RecordBuilder::new(
            SourceType::ClaudeCode,
            Path::new("/tmp/s.jsonl"),
            PricingMode::Auto,
        );
        let usage = TokenUsage {
            input: 10,
            output: 0,
            ..Default::default()
        };
        builder.usage(ts, "claude-sonnet-4", &[("input", 10), ("output", 0)], &usage, Some(0.5));
        builder.set_session_id("s");
        let result = builder.finish();

        assert_eq!(result.metrics.len(), 2);
        assert_eq!(result.metrics[0].metric_name, "claude_code.token.usage");
        assert_eq!(result.metrics[0].attributes["type"], "input");
        assert_eq!(result.metrics[1].metric_name, "claude_code.cost.usage");
        assert_eq!(result.metrics[1].value, Some(0.5));
        assert_eq!(result.metrics[1].attributes["cost.source"], "declared");
        assert!(result.metrics.iter().all(|m| m.attributes[SESSION_ID_ATTR] == "s"));
        assert_eq!(result.first_time, Some(ts));
    }

    #[test]
    fn test_attributes_drops_missing_values() {
        let attrs = attributes([("a", Some("1")), ("b", None)]);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs["a"], "1");
    }
}
