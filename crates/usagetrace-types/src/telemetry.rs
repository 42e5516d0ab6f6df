//! Canonical telemetry records.
//!
//! Every parser, the store and the live ingestion path exchange exactly these
//! shapes. They mirror the OTLP data model closely enough that a record produced
//! from a session log is indistinguishable from one received over the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// String-keyed attribute map. Ordered so serialized output is deterministic.
pub type Attributes = BTreeMap<String, String>;

/// A single log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    pub severity_text: String,
    pub severity_number: i32,
    pub service_name: String,
    pub body: String,
    #[serde(default)]
    pub resource_attributes: Attributes,
    #[serde(default)]
    pub scope_name: String,
    #[serde(default)]
    pub scope_attributes: Attributes,
    #[serde(default)]
    pub log_attributes: Attributes,
}

impl LogRecord {
    /// INFO-level record with empty attribute maps
    pub fn info(
        timestamp: DateTime<Utc>,
        service_name: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            trace_id: None,
            span_id: None,
            severity_text: "INFO".to_string(),
            severity_number: 9,
            service_name: service_name.into(),
            body: body.into(),
            resource_attributes: Attributes::new(),
            scope_name: String::new(),
            scope_attributes: Attributes::new(),
            log_attributes: Attributes::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Gauge,
    Sum,
    Histogram,
    ExponentialHistogram,
    Summary,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
            MetricType::Sum => "sum",
            MetricType::Histogram => "histogram",
            MetricType::ExponentialHistogram => "exponential_histogram",
            MetricType::Summary => "summary",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationTemporality {
    Delta,
    Cumulative,
}

/// One bucket range of an exponential histogram
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExponentialBuckets {
    pub offset: i32,
    pub bucket_counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileValue {
    pub quantile: f64,
    pub value: f64,
}

/// A single metric data point.
///
/// Which numeric fields are populated depends on `metric_type`. Absent fields
/// are `None` rather than zero; `is_monotonic` in particular only has meaning
/// for sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDataPoint {
    pub timestamp: DateTime<Utc>,
    pub service_name: String,
    pub metric_name: String,
    #[serde(default)]
    pub metric_description: String,
    #[serde(default)]
    pub metric_unit: String,
    pub metric_type: MetricType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bucket_counts: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub explicit_bounds: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive: Option<ExponentialBuckets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative: Option<ExponentialBuckets>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quantiles: Vec<QuantileValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_monotonic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation_temporality: Option<AggregationTemporality>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl MetricDataPoint {
    /// Monotonic delta sum, the shape used for token and cost counters
    pub fn delta_sum(
        timestamp: DateTime<Utc>,
        service_name: impl Into<String>,
        metric_name: impl Into<String>,
        unit: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            timestamp,
            service_name: service_name.into(),
            metric_name: metric_name.into(),
            metric_description: String::new(),
            metric_unit: unit.into(),
            metric_type: MetricType::Sum,
            value: Some(value),
            count: None,
            sum: None,
            min: None,
            max: None,
            bucket_counts: Vec::new(),
            explicit_bounds: Vec::new(),
            scale: None,
            zero_count: None,
            positive: None,
            negative: None,
            quantiles: Vec::new(),
            is_monotonic: Some(true),
            aggregation_temporality: Some(AggregationTemporality::Delta),
            attributes: Attributes::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metric_description = description.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Unspecified,
    Internal,
    Server,
    Client,
    Producer,
    Consumer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    Unset,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanEvent {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanLink {
    pub trace_id: String,
    pub span_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_state: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

/// A single span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub timestamp: DateTime<Utc>,
    pub trace_id: String,
    pub span_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_state: Option<String>,
    pub span_name: String,
    pub span_kind: SpanKind,
    pub service_name: String,
    pub duration_ns: i64,
    pub status_code: StatusCode,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub resource_attributes: Attributes,
    #[serde(default)]
    pub span_attributes: Attributes,
    #[serde(default)]
    pub events: Vec<SpanEvent>,
    #[serde(default)]
    pub links: Vec<SpanLink>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_metric_absent_fields_are_not_serialized() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let point = MetricDataPoint::delta_sum(ts, "codex", "codex.token.usage", "tokens", 0.0)
            .with_attribute("type", "input");

        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["value"], 0.0);
        assert_eq!(json["is_monotonic"], true);
        assert!(json.get("count").is_none());
        assert!(json.get("bucket_counts").is_none());

        let back: MetricDataPoint = serde_json::from_value(json).unwrap();
        assert_eq!(back.count, None);
        assert_eq!(back.value, Some(0.0));
    }

    #[test]
    fn test_gauge_without_monotonic_flag_round_trips_as_none() {
        let json = serde_json::json!({
            "timestamp": "2025-01-01T00:00:00Z",
            "service_name": "svc",
            "metric_name": "queue.depth",
            "metric_type": "gauge",
            "value": 3.0
        });
        let point: MetricDataPoint = serde_json::from_value(json).unwrap();
        assert_eq!(point.metric_type, MetricType::Gauge);
        assert_eq!(point.is_monotonic, None);
        assert!(point.attributes.is_empty());
    }
}
