// portside-core/src/domain/constraints.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The configured invariant set the business-rule validator checks the
/// transformed tables against. These are *configuration*, never hardcoded
/// numbers: a different fleet ships a different constraint block.
///
/// BTreeMap keeps the serialized snapshot deterministic across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct FleetConstraints {
    pub total_vessels: usize,
    #[serde(default)]
    pub vessels_by_owner: BTreeMap<String, usize>,
    #[serde(default)]
    pub vessels_by_doc_company: BTreeMap<String, usize>,
    #[serde(default)]
    pub vessels_by_type: BTreeMap<String, usize>,
    pub total_inspections: usize,
    pub total_detentions: usize,
    pub total_clean_inspections: usize,
    pub total_deficiencies: usize,
}
