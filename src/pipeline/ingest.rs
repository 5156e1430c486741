//! Normalization of persisted report metadata.
//!
//! Stored metadata comes in three shapes:
//! - flat: `{"Hemoglobin": 11.2, "WBC": 5.8, "ranges": {...}}`
//! - nested: `{"metrics": {...}, "ranges": {...}}`
//! - ranges only: `{"ranges": {...}}`
//!
//! All of them become one [`ReportMetadata`] here; nothing downstream looks
//! at the raw JSON.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::models::{HistorySnapshot, MetricSet, ReportMetadata, SuppliedBand, SuppliedBands};

/// Keys that are never metrics.
const RESERVED_KEYS: &[&str] = &["ranges", "metrics", "report_date", "date", "filename"];

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d"];

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Metadata is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metadata must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Parse and normalize a metadata JSON document.
pub fn parse_metadata_str(raw: &str) -> Result<ReportMetadata, IngestError> {
    let value: Value = serde_json::from_str(raw)?;
    normalize_metadata(&value)
}

pub fn normalize_metadata(value: &Value) -> Result<ReportMetadata, IngestError> {
    let root = value
        .as_object()
        .ok_or_else(|| IngestError::NotAnObject(json_kind(value)))?;

    let source = root.get("metrics").and_then(Value::as_object).unwrap_or(root);
    let metrics = numeric_entries(source);

    let supplied_bands = root
        .get("ranges")
        .and_then(Value::as_object)
        .map(supplied_bands_from)
        .unwrap_or_default();

    let report_date = root
        .get("report_date")
        .or_else(|| root.get("date"))
        .and_then(Value::as_str)
        .and_then(parse_report_date);

    Ok(ReportMetadata {
        metrics,
        supplied_bands,
        report_date,
    })
}

/// Past report rows (oldest first) as history snapshots.
///
/// Rows that are not objects are skipped with a debug log.
pub fn history_from_values(rows: &[Value]) -> Vec<HistorySnapshot> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match normalize_metadata(row) {
            Ok(meta) => Some(HistorySnapshot {
                date: meta.report_date,
                metrics: meta.metrics,
            }),
            Err(e) => {
                tracing::debug!(index, error = %e, "Skipping history row");
                None
            }
        })
        .collect()
}

/// Accepts `dd/mm/YYYY` or `YYYY-MM-DD`.
pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// A JSON number, or a string holding one. Non-finite results are rejected.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn numeric_entries(map: &Map<String, Value>) -> MetricSet {
    map.iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| match coerce_number(value) {
            Some(n) => Some((key.clone(), n)),
            None => {
                tracing::debug!(metric = %key, "Dropping non-numeric metric value");
                None
            }
        })
        .collect()
}

fn supplied_bands_from(ranges: &Map<String, Value>) -> SuppliedBands {
    ranges
        .iter()
        .filter_map(|(metric, entry)| {
            let entry = entry.as_object()?;
            let band = SuppliedBand {
                min: entry.get("min").and_then(coerce_number),
                max: entry.get("max").and_then(coerce_number),
                unit: entry
                    .get("unit")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            };
            Some((metric.clone(), band))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn flat_shape() {
        let meta = normalize_metadata(&json!({
            "Hemoglobin": 11.2,
            "WBC": "5.8",
            "report_date": "03/02/2024",
            "filename": "cbc.pdf",
            "ranges": {"Hemoglobin": {"min": 13.0, "max": 17.0, "unit": "g/dL"}}
        }))
        .unwrap();

        assert_eq!(meta.metrics.len(), 2);
        assert_eq!(meta.metrics["Hemoglobin"], 11.2);
        assert_eq!(meta.metrics["WBC"], 5.8);
        assert_eq!(meta.report_date, NaiveDate::from_ymd_opt(2024, 2, 3));
        assert_eq!(
            meta.supplied_bands["Hemoglobin"].validated().unwrap().unit,
            "g/dL"
        );
    }

    #[test]
    fn nested_shape() {
        let meta = normalize_metadata(&json!({
            "metrics": {"Glucose": 101, "ranges": 5},
            "ranges": {"Glucose": {"min": 70, "max": 99}},
            "date": "2024-05-01"
        }))
        .unwrap();

        assert_eq!(meta.metrics.len(), 1);
        assert_eq!(meta.metrics["Glucose"], 101.0);
        assert_eq!(meta.report_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(meta.supplied_bands["Glucose"].unit, None);
    }

    #[test]
    fn ranges_only_shape() {
        let meta = normalize_metadata(&json!({
            "ranges": {"WBC": {"min": 4, "max": 11, "unit": "10^3/µL"}}
        }))
        .unwrap();
        assert!(meta.metrics.is_empty());
        assert_eq!(meta.supplied_bands.len(), 1);
    }

    #[test]
    fn non_numeric_values_dropped() {
        let meta = normalize_metadata(&json!({
            "Hemoglobin": "n/a",
            "WBC": null,
            "RBC": {"value": 4.5},
            "Platelets": 250
        }))
        .unwrap();
        assert_eq!(meta.metrics.len(), 1);
        assert!(meta.metrics.contains_key("Platelets"));
    }

    #[test]
    fn non_numeric_band_bounds_become_none() {
        let meta = normalize_metadata(&json!({
            "ranges": {"Hemoglobin": {"min": "low", "max": 17}}
        }))
        .unwrap();
        let band = &meta.supplied_bands["Hemoglobin"];
        assert_eq!(band.min, None);
        assert_eq!(band.max, Some(17.0));
        assert!(band.validated().is_none());
    }

    #[test]
    fn rejects_non_object() {
        assert!(matches!(
            normalize_metadata(&json!([1, 2])),
            Err(IngestError::NotAnObject("array"))
        ));
        assert!(matches!(parse_metadata_str("{not json"), Err(IngestError::Json(_))));
    }

    #[test]
    fn unknown_date_format_is_none() {
        assert_eq!(parse_report_date("Unknown"), None);
        assert_eq!(parse_report_date(" 31/12/2023 "), NaiveDate::from_ymd_opt(2023, 12, 31));
    }

    #[test]
    fn history_skips_bad_rows() {
        let rows = vec![
            json!({"Hemoglobin": 12.0, "report_date": "01/01/2024"}),
            json!("garbage"),
            json!({"metrics": {"Hemoglobin": 12.5}}),
        ];
        let history = history_from_values(&rows);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].metrics["Hemoglobin"], 12.0);
        assert!(history[0].date.is_some());
        assert_eq!(history[1].metrics["Hemoglobin"], 12.5);
    }
}
