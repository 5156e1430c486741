//! Curated advice for common CBC and glucose findings.
//!
//! Static and consistent across runs. Always shown alongside [`DISCLAIMER`].

use crate::models::AbnormalStatus;

/// Advice for one `(metric, status)` pair.
pub struct CuratedAdvice {
    pub metric: &'static str,
    pub status: AbnormalStatus,
    pub home: &'static [&'static str],
    pub meds: &'static [&'static str],
}

pub const DISCLAIMER: &str = "Discuss results with your clinician, especially if you have symptoms.";

const GENERIC_HOME_HIGH: &str =
    "Reduce added sugars/refined carbs; hydrate; increase physical activity where safe.";
const GENERIC_HOME_LOW: &str =
    "Ensure balanced nutrition and regular meals; consider common nutrient gaps.";
const GENERIC_MEDS_HIGH: &str = "Medication choices depend on cause. Seek clinician advice.";
const GENERIC_MEDS_LOW: &str = "Supplements/medicines should be clinician-guided after tests.";

/// Generic home suggestion for a status with no curated entry.
pub fn generic_home(status: AbnormalStatus) -> Option<&'static str> {
    match status {
        AbnormalStatus::High => Some(GENERIC_HOME_HIGH),
        AbnormalStatus::Low => Some(GENERIC_HOME_LOW),
        AbnormalStatus::Normal => None,
    }
}

/// Generic medical-consult suggestion for a status with no curated entry.
pub fn generic_meds(status: AbnormalStatus) -> Option<&'static str> {
    match status {
        AbnormalStatus::High => Some(GENERIC_MEDS_HIGH),
        AbnormalStatus::Low => Some(GENERIC_MEDS_LOW),
        AbnormalStatus::Normal => None,
    }
}

macro_rules! advice {
    ($metric:literal, $status:ident, home: [$($h:literal),* $(,)?], meds: [$($m:literal),* $(,)?]) => {
        CuratedAdvice {
            metric: $metric,
            status: AbnormalStatus::$status,
            home: &[$($h),*],
            meds: &[$($m),*],
        }
    };
}

pub static CURATED_ADVICE: &[CuratedAdvice] = &[
    advice!("Hemoglobin", Low,
        home: [
            "Iron-rich foods: lean red meat, chicken, fish, spinach, beans, lentils.",
            "Add vitamin C (citrus, amla, bell peppers) with iron meals to boost absorption.",
            "Avoid tea/coffee within 1–2 hours of iron-rich meals.",
            "Ensure adequate B12/folate intake (eggs, dairy, green leafy veg).",
        ],
        meds: [
            "Discuss oral iron (e.g., ferrous sulfate) with your doctor.",
            "If B12/folate deficiency is suspected, supplementation may be needed (doctor-guided).",
        ]),
    advice!("Hemoglobin", High,
        home: ["Hydrate well; avoid smoking if applicable."],
        meds: ["High hemoglobin can have serious causes (e.g., polycythemia). Seek medical review."]),
    advice!("Hematocrit", Low,
        home: ["Similar to low hemoglobin: iron-rich diet + vitamin C, consider B12/folate sources."],
        meds: ["Doctor may recommend iron/B12/folate after evaluation."]),
    advice!("Hematocrit", High,
        home: ["Hydration; avoid smoking."],
        meds: ["See your doctor to assess causes such as dehydration or polycythemia."]),
    advice!("WBC", Low,
        home: [
            "Practice infection precautions (hand hygiene, avoid sick contacts).",
            "Adequate sleep and nutrition.",
        ],
        meds: ["Further evaluation needed. Do not start antibiotics without prescription."]),
    advice!("WBC", High,
        home: ["Rest, hydrate; monitor temperature."],
        meds: ["High WBC often reflects infection/inflammation. Seek medical advice, especially with fever."]),
    advice!("Platelets", Low,
        home: ["Avoid alcohol; avoid NSAIDs like ibuprofen unless doctor says otherwise."],
        meds: ["Low platelets can cause bleeding risk. Get doctor guidance promptly."]),
    advice!("Platelets", High,
        home: ["Hydration; treat underlying issues per doctor advice."],
        meds: ["Persistent high platelets need medical evaluation."]),
    advice!("Glucose", High,
        home: [
            "Reduce refined carbs/sugary drinks; shift to high-fiber, low-glycemic meals.",
            "Aim ≥150 min/week moderate exercise + resistance training 2–3x/week.",
            "Weight management if overweight; consistent sleep schedule.",
        ],
        meds: [
            "Discuss metformin or other therapies with your doctor if fasting glucose remains high.",
            "Monitor fasting and post-meal glucose; keep a log.",
        ]),
    advice!("Glucose", Low,
        home: [
            "If symptomatic and truly low, take quick carbs (glucose tablets/juice) and recheck.",
            "Ensure regular balanced meals; avoid skipping meals.",
        ],
        meds: ["Recurrent low glucose needs medical review to adjust medicines/diet."]),
    advice!("MCV", Low,
        home: ["Often due to iron deficiency. See Hemoglobin (low)."],
        meds: ["Doctor may treat iron deficiency after tests (ferritin, iron studies)."]),
    advice!("MCV", High,
        home: ["Increase B12/folate foods (eggs, dairy, spinach, legumes)."],
        meds: ["Doctor may evaluate B12/folate levels; supplementation if deficient."]),
    advice!("MCH", Low,
        home: ["Track with Hemoglobin/MCV: iron-rich diet + vitamin C."],
        meds: ["Doctor-guided iron therapy if deficient."]),
    advice!("MCH", High,
        home: ["Check B12/folate intake; limit alcohol if high intake."],
        meds: ["Doctor may check B12/folate; supplementation as needed."]),
    advice!("MCHC", Low,
        home: ["As with iron-deficiency patterns, optimize iron and vitamin C."],
        meds: ["Doctor may recommend iron after testing."]),
    advice!("MCHC", High,
        home: ["Hydration; discuss with doctor (may relate to hemolysis/lab artifact)."],
        meds: ["Needs clinical correlation by a doctor."]),
    // ESR has no low entry; low ESR falls back to the generic advice.
    advice!("ESR", High,
        home: ["Anti-inflammatory diet (omega-3s, fruits/veg), gentle activity, adequate sleep."],
        meds: ["ESR is nonspecific; clinical evaluation recommended if persistently high."]),
    advice!("RBC", Low,
        home: ["Similar to low hemoglobin: iron-rich diet; B12/folate as appropriate."],
        meds: ["Doctor may treat underlying anemia after evaluation."]),
    advice!("RBC", High,
        home: ["Hydration; avoid smoking."],
        meds: ["Requires medical evaluation."]),
];

/// Curated advice for a metric and status, matched case-insensitively.
pub fn curated_advice(
    knowledge: &'static [CuratedAdvice],
    metric: &str,
    status: AbnormalStatus,
) -> Option<&'static CuratedAdvice> {
    let metric = metric.trim();
    knowledge
        .iter()
        .find(|a| a.status == status && a.metric.eq_ignore_ascii_case(metric))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_has_home_and_meds() {
        for advice in CURATED_ADVICE {
            assert!(!advice.home.is_empty(), "{} {} has no home advice", advice.metric, advice.status);
            assert!(!advice.meds.is_empty(), "{} {} has no meds advice", advice.metric, advice.status);
            assert!(advice.status.is_abnormal());
        }
    }

    #[test]
    fn no_duplicate_pairs() {
        for (i, a) in CURATED_ADVICE.iter().enumerate() {
            for b in &CURATED_ADVICE[i + 1..] {
                assert!(
                    !(a.metric == b.metric && a.status == b.status),
                    "duplicate entry for {} {}",
                    a.metric,
                    a.status
                );
            }
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(curated_advice(CURATED_ADVICE, "hemoglobin", AbnormalStatus::Low).is_some());
        assert!(curated_advice(CURATED_ADVICE, "ESR", AbnormalStatus::Low).is_none());
        assert!(curated_advice(CURATED_ADVICE, "Hemoglobin", AbnormalStatus::Normal).is_none());
    }

    #[test]
    fn generic_fallbacks_only_for_abnormal() {
        assert!(generic_home(AbnormalStatus::High).is_some());
        assert!(generic_meds(AbnormalStatus::Low).is_some());
        assert!(generic_home(AbnormalStatus::Normal).is_none());
    }
}
