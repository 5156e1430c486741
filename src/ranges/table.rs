//! Static reference range table.
//!
//! Canonical adult normal ranges for common labs. Immutable; safe for
//! unsynchronized concurrent reads.

use std::collections::BTreeMap;

use crate::models::ReferenceBand;

/// `(metric, low, high, unit)`.
const REFERENCE_RANGES: &[(&str, f64, f64, &str)] = &[
    ("Hemoglobin", 13.0, 17.0, "g/dL"),
    ("Hematocrit", 38.8, 50.0, "%"),
    ("RBC", 4.5, 6.0, "10^6/µL"),
    ("WBC", 4.0, 11.0, "10^3/µL"),
    ("Platelets", 150.0, 450.0, "10^3/µL"),
    ("MCV", 80.0, 100.0, "fL"),
    ("MCH", 27.0, 33.0, "pg"),
    ("MCHC", 32.0, 36.0, "g/dL"),
    ("Glucose", 70.0, 99.0, "mg/dL"),
    ("Creatinine", 0.6, 1.3, "mg/dL"),
    ("Urea", 15.0, 45.0, "mg/dL"),
    ("Cholesterol", 125.0, 200.0, "mg/dL"),
    ("HDL", 40.0, 60.0, "mg/dL"),
    ("LDL", 0.0, 100.0, "mg/dL"),
    ("Triglycerides", 0.0, 150.0, "mg/dL"),
    ("Vitamin D", 20.0, 50.0, "ng/mL"),
    ("Calcium", 8.5, 10.5, "mg/dL"),
    ("Bilirubin", 0.1, 1.2, "mg/dL"),
    ("SGOT", 0.0, 40.0, "U/L"),
    ("SGPT", 0.0, 45.0, "U/L"),
    ("TSH", 0.4, 4.0, "µIU/mL"),
];

/// Look up a metric's band.
///
/// Tries the exact name, then the normalized name ("  hemoglobin " →
/// "Hemoglobin"), then a case-insensitive match so abbreviations such as
/// "wbc" still find "WBC".
pub fn lookup_reference_range(metric: &str) -> Option<ReferenceBand> {
    find_exact(metric)
        .or_else(|| find_exact(&normalize_metric_name(metric)))
        .or_else(|| {
            let trimmed = metric.trim();
            REFERENCE_RANGES
                .iter()
                .find(|(name, ..)| name.eq_ignore_ascii_case(trimmed))
        })
        .map(|&(_, low, high, unit)| ReferenceBand::new(low, high, unit))
}

/// Trim and capitalize each word: "vitamin d" → "Vitamin D".
pub fn normalize_metric_name(metric: &str) -> String {
    metric
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The whole table as `{metric: band}`.
pub fn static_reference_ranges() -> BTreeMap<String, ReferenceBand> {
    REFERENCE_RANGES
        .iter()
        .map(|&(name, low, high, unit)| (name.to_string(), ReferenceBand::new(low, high, unit)))
        .collect()
}

fn find_exact(metric: &str) -> Option<&'static (&'static str, f64, f64, &'static str)> {
    REFERENCE_RANGES.iter().find(|(name, ..)| *name == metric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_lookup() {
        let band = lookup_reference_range("Hemoglobin").unwrap();
        assert_eq!(band, ReferenceBand::new(13.0, 17.0, "g/dL"));
    }

    #[test]
    fn normalized_lookup() {
        let band = lookup_reference_range("  hemoglobin ").unwrap();
        assert_eq!(band.low, 13.0);
        let band = lookup_reference_range("vitamin d").unwrap();
        assert_eq!(band.unit, "ng/mL");
    }

    #[test]
    fn abbreviation_lookup_is_case_insensitive() {
        let band = lookup_reference_range("wbc").unwrap();
        assert_eq!(band.high, 11.0);
        assert!(lookup_reference_range("Mchc").is_some());
    }

    #[test]
    fn unknown_metric() {
        assert!(lookup_reference_range("Ferritin").is_none());
        assert!(lookup_reference_range("").is_none());
    }

    #[test]
    fn every_entry_is_valid() {
        for (name, band) in static_reference_ranges() {
            assert!(band.is_valid(), "{name} has an invalid band");
        }
    }

    #[test]
    fn normalize_metric_name_title_cases() {
        assert_eq!(normalize_metric_name("  hemoglobin "), "Hemoglobin");
        assert_eq!(normalize_metric_name("VITAMIN   d"), "Vitamin D");
        assert_eq!(normalize_metric_name(""), "");
    }
}
