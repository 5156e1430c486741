//! Guidance for abnormal metrics.
//!
//! Only metrics classified `low` or `high` get a bundle. Curated advice is
//! used when present; otherwise a generic sentence keyed by status fills
//! the gap so `home` and `meds` are never empty.

pub mod knowledge;

pub use knowledge::{curated_advice, CuratedAdvice, CURATED_ADVICE, DISCLAIMER};

use crate::classify::classify;
use crate::models::{AbnormalStatus, BandMap, GuidanceBundle, GuidanceMap, MetricSet};

pub struct GuidanceEngine {
    knowledge: &'static [CuratedAdvice],
}

impl Default for GuidanceEngine {
    fn default() -> Self {
        Self::new(CURATED_ADVICE)
    }
}

impl GuidanceEngine {
    pub fn new(knowledge: &'static [CuratedAdvice]) -> Self {
        Self { knowledge }
    }

    /// Bundles for every abnormal metric that has a band.
    pub fn advise(&self, metrics: &MetricSet, bands: &BandMap) -> GuidanceMap {
        let mut out = GuidanceMap::new();
        for (name, &value) in metrics {
            let Some(band) = bands.get(name) else {
                continue;
            };
            if let Some(bundle) = self.bundle_for(name, classify(value, band)) {
                out.insert(name.clone(), bundle);
            }
        }
        tracing::debug!(abnormal = out.len(), "Guidance generated");
        out
    }

    /// Bundle for one metric and status; `None` for normal.
    pub fn bundle_for(&self, metric: &str, status: AbnormalStatus) -> Option<GuidanceBundle> {
        if !status.is_abnormal() {
            return None;
        }

        let curated = curated_advice(self.knowledge, metric, status);

        let mut home = to_owned_list(curated.map(|a| a.home));
        let mut meds = to_owned_list(curated.map(|a| a.meds));
        if home.is_empty() {
            home.extend(knowledge::generic_home(status).map(str::to_string));
        }
        if meds.is_empty() {
            meds.extend(knowledge::generic_meds(status).map(str::to_string));
        }

        Some(GuidanceBundle {
            status,
            home,
            meds,
            note: DISCLAIMER.to_string(),
        })
    }
}

fn to_owned_list(items: Option<&[&str]>) -> Vec<String> {
    items
        .unwrap_or_default()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReferenceBand;

    fn fixture() -> (MetricSet, BandMap) {
        let mut metrics = MetricSet::new();
        let mut bands = BandMap::new();
        for (name, value, low, high) in [
            ("Hemoglobin", 9.5, 13.0, 17.0),
            ("WBC", 7.0, 4.0, 11.0),
            ("Glucose", 99.0, 70.0, 99.0),
            ("Ferritin", 500.0, 24.0, 336.0),
            ("ESR", 1.0, 2.0, 20.0),
        ] {
            metrics.insert(name.into(), value);
            bands.insert(name.into(), ReferenceBand::new(low, high, ""));
        }
        (metrics, bands)
    }

    #[test]
    fn hemoglobin_low_gets_curated_iron_advice() {
        let (metrics, bands) = fixture();
        let guidance = GuidanceEngine::default().advise(&metrics, &bands);

        let hb = &guidance["Hemoglobin"];
        assert_eq!(hb.status, AbnormalStatus::Low);
        assert!(hb.home[0].starts_with("Iron-rich foods"));
        assert!(hb.meds[0].contains("oral iron"));
        assert_eq!(hb.note, DISCLAIMER);
    }

    #[test]
    fn normal_metrics_never_appear() {
        let (metrics, bands) = fixture();
        let guidance = GuidanceEngine::default().advise(&metrics, &bands);

        assert!(!guidance.contains_key("WBC"));
        // Equal to the upper bound is normal
        assert!(!guidance.contains_key("Glucose"));
        assert!(guidance.values().all(|g| g.status.is_abnormal()));
    }

    #[test]
    fn uncurated_metric_gets_generic_advice() {
        let (metrics, bands) = fixture();
        let guidance = GuidanceEngine::default().advise(&metrics, &bands);

        let ferritin = &guidance["Ferritin"];
        assert_eq!(ferritin.status, AbnormalStatus::High);
        assert_eq!(ferritin.home.len(), 1);
        assert_eq!(ferritin.meds.len(), 1);
        assert!(ferritin.meds[0].contains("clinician"));
    }

    #[test]
    fn missing_status_entry_gets_generic_advice() {
        let (metrics, bands) = fixture();
        let guidance = GuidanceEngine::default().advise(&metrics, &bands);

        let esr = &guidance["ESR"];
        assert_eq!(esr.status, AbnormalStatus::Low);
        assert_eq!(
            esr.home,
            vec![knowledge::generic_home(AbnormalStatus::Low).unwrap().to_string()]
        );
    }

    #[test]
    fn every_abnormal_bundle_is_complete() {
        let engine = GuidanceEngine::default();
        for metric in ["Hemoglobin", "Creatinine", "TSH", "Unknown"] {
            for status in [AbnormalStatus::Low, AbnormalStatus::High] {
                let bundle = engine.bundle_for(metric, status).unwrap();
                assert!(!bundle.home.is_empty());
                assert!(!bundle.meds.is_empty());
            }
        }
        assert!(engine.bundle_for("Hemoglobin", AbnormalStatus::Normal).is_none());
    }

    #[test]
    fn custom_knowledge_base() {
        static KB: &[CuratedAdvice] = &[CuratedAdvice {
            metric: "TSH",
            status: AbnormalStatus::High,
            home: &["Take levothyroxine on an empty stomach."],
            meds: &["Ask about thyroid follow-up."],
        }];
        let bundle = GuidanceEngine::new(KB)
            .bundle_for("tsh", AbnormalStatus::High)
            .unwrap();
        assert_eq!(bundle.meds, vec!["Ask about thyroid follow-up.".to_string()]);
    }
}
