use rusqlite::{Connection, params};
use usagetrace_types::{MetricDataPoint, unix_nanos};

use super::{enum_name, opt_json, to_json};
use crate::Result;

pub const TABLE: &str = "metrics";
pub const ATTRIBUTES: &str = "attributes";

pub fn insert_batch(conn: &Connection, metrics: &[MetricDataPoint]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        r#"
        INSERT INTO metrics (timestamp, service_name, metric_name, metric_description,
                             metric_unit, metric_type, value, count, sum, min, max,
                             bucket_counts, explicit_bounds, scale, zero_count,
                             positive, negative, quantiles, is_monotonic,
                             aggregation_temporality, attributes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)
        "#,
    )?;

    for point in metrics {
        let positive = point.positive.as_ref().map(to_json).transpose()?;
        let negative = point.negative.as_ref().map(to_json).transpose()?;
        let temporality = point
            .aggregation_temporality
            .as_ref()
            .map(enum_name)
            .transpose()?;

        stmt.execute(params![
            unix_nanos(&point.timestamp),
            &point.service_name,
            &point.metric_name,
            &point.metric_description,
            &point.metric_unit,
            point.metric_type.as_str(),
            point.value,
            point.count.map(|c| c as i64),
            point.sum,
            point.min,
            point.max,
            opt_json(&point.bucket_counts)?,
            opt_json(&point.explicit_bounds)?,
            point.scale,
            point.zero_count.map(|c| c as i64),
            positive,
            negative,
            opt_json(&point.quantiles)?,
            point.is_monotonic,
            temporality,
            to_json(&point.attributes)?,
        ])?;
    }

    Ok(metrics.len())
}
