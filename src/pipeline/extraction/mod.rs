//! Metric extraction from free report text.
//!
//! Misses are absence, never errors: a label that is not found, or a capture
//! that does not parse, simply leaves the metric out of the result.

pub mod vocabulary;

pub use vocabulary::{known_metrics, MetricPattern, METRIC_PATTERNS};

use crate::models::MetricSet;

/// Collapse every whitespace run to a single space and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract `{metric: value}` using the first match per metric.
pub fn extract(text: &str) -> MetricSet {
    let cleaned = clean_text(text);
    let mut metrics = MetricSet::new();

    for pattern in METRIC_PATTERNS.iter() {
        // Matches naming a different analyte ("HDL Cholesterol") are passed over.
        let Some(raw) = pattern
            .regex
            .captures_iter(&cleaned)
            .find_map(|caps| pattern.value(&caps))
        else {
            continue;
        };
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                metrics.insert(pattern.name.to_string(), value);
            }
            _ => tracing::debug!(metric = pattern.name, "Unparseable metric capture dropped"),
        }
    }

    tracing::debug!(count = metrics.len(), "Metrics extracted");
    metrics
}
