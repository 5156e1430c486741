use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::AbnormalStatus;

/// Advice attached to one abnormal metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceBundle {
    pub status: AbnormalStatus,
    /// Lifestyle / at-home suggestions. Never empty.
    pub home: Vec<String>,
    /// Medication / clinical-consult suggestions. Never empty.
    pub meds: Vec<String>,
    pub note: String,
}

/// Metric name → guidance. Contains abnormal metrics only.
pub type GuidanceMap = BTreeMap<String, GuidanceBundle>;
