use std::sync::LazyLock;

use regex::{Captures, Regex};

/// A recognized lab label and the pattern capturing its value.
///
/// Guarded patterns also capture a qualifier (`before` or `after` the label)
/// that names a different analyte, e.g. "HDL Cholesterol" or
/// "Bilirubin Direct". Such matches are skipped.
pub struct MetricPattern {
    pub name: &'static str,
    pub regex: Regex,
}

impl MetricPattern {
    /// The value of a match, unless a qualifier turned it into another analyte.
    pub fn value<'t>(&self, caps: &Captures<'t>) -> Option<&'t str> {
        if caps.name("before").is_some() || caps.name("after").is_some() {
            return None;
        }
        caps.name("value").map(|m| m.as_str())
    }
}

/// Label, then any run of non-digit characters except `-`, then the number.
/// A leading sign stops the skip, so signed values are never captured.
const VALUE: &str = r"[^0-9\-]*(?P<value>[0-9]+(?:\.[0-9]+)?)";

fn pattern(name: &'static str, label: &str) -> MetricPattern {
    compile(name, format!(r"(?i){label}{VALUE}"))
}

/// Pattern whose label is disqualified by a qualifier right before or after it.
/// Either side may be empty.
fn guarded(name: &'static str, before: &str, label: &str, after: &str) -> MetricPattern {
    let mut source = String::from("(?i)");
    if !before.is_empty() {
        source.push_str(&format!(r"(?:\b(?P<before>{before})[\s\-,]*)?"));
    }
    source.push_str(label);
    if !after.is_empty() {
        source.push_str(&format!(r"(?:[\s,:(]*(?P<after>{after})\b)?"));
    }
    source.push_str(VALUE);
    compile(name, source)
}

fn compile(name: &'static str, source: String) -> MetricPattern {
    MetricPattern {
        name,
        regex: Regex::new(&source).expect("Invalid metric regex pattern"),
    }
}

pub static METRIC_PATTERNS: LazyLock<Vec<MetricPattern>> = LazyLock::new(|| {
    vec![
        // Complete blood count
        guarded("Hemoglobin", "glycated|glycosylated", r"\bhemoglobin\b", "a1c"),
        pattern("Hematocrit", r"\bhematocrit"),
        pattern("RBC", r"\bRBC\b"),
        pattern("WBC", r"\bWBC\b"),
        pattern("Platelets", r"\bplatelets?\b"),
        pattern("MCV", r"\bMCV\b"),
        // Word boundary keeps MCH from matching inside MCHC
        pattern("MCH", r"\bMCH\b"),
        pattern("MCHC", r"\bMCHC\b"),
        // Chemistry
        pattern("Glucose", r"\bglucose(?:\s*\(fasting\))?"),
        pattern("Creatinine", r"\bcreatinine\b"),
        guarded("Urea", "", r"\burea\b", "nitrogen"),
        guarded(
            "Cholesterol",
            "non-hdl|hdl|vldl|ldl",
            r"\b(?:total\s+)?cholesterol\b",
            "non-hdl|hdl|vldl|ldl",
        ),
        guarded("HDL", "non", r"\bHDL\b", ""),
        pattern("LDL", r"\bLDL\b"),
        pattern("Triglycerides", r"\btriglycerides?\b"),
        pattern("Calcium", r"\bcalcium\b"),
        guarded(
            "Bilirubin",
            "direct|indirect|conjugated|unconjugated",
            r"\b(?:total\s+)?bilirubin\b",
            "direct|indirect|conjugated|unconjugated",
        ),
        pattern("TSH", r"\bTSH\b"),
    ]
});

/// Names of every metric the extractor can recognize.
pub fn known_metrics() -> Vec<&'static str> {
    METRIC_PATTERNS.iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> &'static MetricPattern {
        METRIC_PATTERNS.iter().find(|p| p.name == name).unwrap()
    }

    #[test]
    fn all_patterns_compile() {
        assert_eq!(METRIC_PATTERNS.len(), 18);
    }

    #[test]
    fn names_are_unique() {
        let mut names = known_metrics();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), METRIC_PATTERNS.len());
    }

    #[test]
    fn every_metric_has_a_reference_range() {
        for name in known_metrics() {
            assert!(
                crate::ranges::lookup_reference_range(name).is_some(),
                "{name} missing from reference table"
            );
        }
    }

    #[test]
    fn qualified_labels_yield_no_value() {
        let cholesterol = named("Cholesterol");
        for text in ["HDL Cholesterol 45", "Non-HDL Cholesterol 150", "Cholesterol, LDL 120"] {
            let caps = cholesterol.regex.captures(text).unwrap();
            assert_eq!(cholesterol.value(&caps), None, "{text}");
        }
        let caps = cholesterol.regex.captures("Total Cholesterol 190").unwrap();
        assert_eq!(cholesterol.value(&caps), Some("190"));
    }

    #[test]
    fn trailing_qualifier_is_caught() {
        let bilirubin = named("Bilirubin");
        let caps = bilirubin.regex.captures("Bilirubin Direct 0.2").unwrap();
        assert_eq!(bilirubin.value(&caps), None);

        let urea = named("Urea");
        let caps = urea.regex.captures("Blood Urea Nitrogen (BUN) 14").unwrap();
        assert_eq!(urea.value(&caps), None);
    }
}
