use serde::{Deserialize, Serialize};

/// Clinically normal `[low, high]` interval for a metric.
///
/// Serialized as `{min, max, unit}`, the shape collaborators store and send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBand {
    #[serde(rename = "min")]
    pub low: f64,
    #[serde(rename = "max")]
    pub high: f64,
    #[serde(default)]
    pub unit: String,
}

impl ReferenceBand {
    pub fn new(low: f64, high: f64, unit: impl Into<String>) -> Self {
        Self {
            low,
            high,
            unit: unit.into(),
        }
    }

    /// Usable for classification: finite bounds, `high > low`, not `(0, 0)`.
    pub fn is_valid(&self) -> bool {
        self.low.is_finite()
            && self.high.is_finite()
            && self.high > self.low
            && !(self.low == 0.0 && self.high == 0.0)
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// "13–17 g/dL" style label. Unit omitted when empty.
    pub fn display_range(&self) -> String {
        let range = format!("{}–{}", self.low, self.high);
        if self.unit.is_empty() {
            range
        } else {
            format!("{range} {}", self.unit)
        }
    }
}

/// A band as handed over by a caller, before validation.
///
/// Bounds that were missing or non-numeric at the ingestion boundary are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuppliedBand {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl SuppliedBand {
    pub fn new(min: f64, max: f64, unit: Option<&str>) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            unit: unit.map(str::to_string),
        }
    }

    /// The band, if both bounds are present and form a valid interval.
    pub fn validated(&self) -> Option<ReferenceBand> {
        let band = ReferenceBand::new(self.min?, self.max?, self.unit.clone().unwrap_or_default());
        band.is_valid().then_some(band)
    }
}
