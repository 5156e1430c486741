//! Three-way classification of a value against its reference band.

use crate::models::{AbnormalStatus, BandMap, MetricSet, ReferenceBand, StatusMap};

/// Strict comparison: values equal to either bound are normal.
///
/// Expects a band already repaired by the range resolver.
pub fn classify(value: f64, band: &ReferenceBand) -> AbnormalStatus {
    if value < band.low {
        AbnormalStatus::Low
    } else if value > band.high {
        AbnormalStatus::High
    } else {
        AbnormalStatus::Normal
    }
}

/// Classify every metric that has a band. Metrics without one are skipped.
pub fn classify_all(metrics: &MetricSet, bands: &BandMap) -> StatusMap {
    metrics
        .iter()
        .filter_map(|(name, &value)| {
            let band = bands.get(name)?;
            Some((name.clone(), classify(value, band)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hb() -> ReferenceBand {
        ReferenceBand::new(13.0, 17.0, "g/dL")
    }

    #[test]
    fn below_band_is_low() {
        assert_eq!(classify(9.5, &hb()), AbnormalStatus::Low);
    }

    #[test]
    fn above_band_is_high() {
        assert_eq!(classify(17.01, &hb()), AbnormalStatus::High);
    }

    #[test]
    fn boundaries_are_normal() {
        assert_eq!(classify(13.0, &hb()), AbnormalStatus::Normal);
        assert_eq!(classify(17.0, &hb()), AbnormalStatus::Normal);
        assert_eq!(classify(15.0, &hb()), AbnormalStatus::Normal);
    }

    #[test]
    fn zero_lower_bound() {
        let ldl = ReferenceBand::new(0.0, 100.0, "mg/dL");
        assert_eq!(classify(0.0, &ldl), AbnormalStatus::Normal);
        assert_eq!(classify(130.0, &ldl), AbnormalStatus::High);
    }

    #[test]
    fn classify_all_skips_metrics_without_band() {
        let mut metrics = MetricSet::new();
        metrics.insert("Hemoglobin".into(), 9.5);
        metrics.insert("Ferritin".into(), 12.0);
        let mut bands = BandMap::new();
        bands.insert("Hemoglobin".into(), hb());

        let statuses = classify_all(&metrics, &bands);
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses["Hemoglobin"], AbnormalStatus::Low);
    }
}
