use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::band::{ReferenceBand, SuppliedBand};
use super::enums::{AbnormalStatus, BandSource};

/// Metric name → value parsed from one report. Absence means "not detected".
pub type MetricSet = BTreeMap<String, f64>;

/// Caller-supplied bands, keyed by metric name, before validation.
pub type SuppliedBands = BTreeMap<String, SuppliedBand>;

/// Finalized bands, keyed by metric name. Every entry satisfies `high > low`.
pub type BandMap = BTreeMap<String, ReferenceBand>;

/// Metric name → abnormality status.
pub type StatusMap = BTreeMap<String, AbnormalStatus>;

/// Metric name → where its finalized band came from.
pub type SourceMap = BTreeMap<String, BandSource>;

/// Metric name → recent values, oldest first.
pub type TrendSeries = BTreeMap<String, Vec<f64>>;

/// One past report as handed over by the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub date: Option<NaiveDate>,
    pub metrics: MetricSet,
}

impl HistorySnapshot {
    pub fn new(metrics: MetricSet) -> Self {
        Self {
            date: None,
            metrics,
        }
    }
}

/// Strict internal shape of persisted report metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub metrics: MetricSet,
    pub supplied_bands: SuppliedBands,
    pub report_date: Option<NaiveDate>,
}
