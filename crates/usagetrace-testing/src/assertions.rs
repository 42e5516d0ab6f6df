//! Helpers for inspecting canonical records in tests.

use usagetrace_types::{LogRecord, MetricDataPoint};

/// Values of `metric` data points, optionally restricted to one `type` attribute
pub fn metric_values(metrics: &[MetricDataPoint], metric: &str, kind: Option<&str>) -> Vec<f64> {
    metrics
        .iter()
        .filter(|m| m.metric_name == metric)
        .filter(|m| kind.is_none_or(|k| m.attributes.get("type").map(String::as_str) == Some(k)))
        .filter_map(|m| m.value)
        .collect()
}

/// Log bodies in order
pub fn log_bodies(logs: &[LogRecord]) -> Vec<&str> {
    logs.iter().map(|l| l.body.as_str()).collect()
}

/// Assert two costs agree to within a micro-dollar fraction
pub fn assert_cost_eq(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "cost mismatch: expected {}, got {}",
        expected,
        actual
    );
}
