// portside-core/src/domain/model/vessel.rs

use serde::{Deserialize, Serialize};

/// Normalized vessel master row.
///
/// Identity fields are immutable once created from the fleet roster.
/// The performance block (`total_inspections` through `clean_rate`) is
/// *derived*: it is flattened from the roster's historical metrics and the
/// business-rule validator recomputes it from the inspection facts every run.
/// `owner` and `doc_company` are copied verbatim from the raw roster — any
/// mismatch must surface as a validation failure, never be silently corrected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vessel {
    pub vessel_id: String,
    pub name: String,
    pub imo_number: Option<String>,
    pub vessel_type: String,
    pub owner: String,
    pub doc_company: String,
    pub flag_state: String,
    pub class_society: String,
    pub built_year: i32,
    pub dwt: Option<u64>,

    // Derived performance block (flat, no nested duplicate kept)
    pub total_inspections: u32,
    pub total_deficiencies: u32,
    pub detention_count: u32,
    pub clean_inspections: u32,
    pub detention_rate: f64,
    pub clean_rate: f64,
}

/// Master row for an owner, derived from the vessel master.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerMaster {
    pub owner: String,
    pub vessel_count: usize,
    pub vessels: Vec<String>,
}

/// Master row for a Document of Compliance holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocCompanyMaster {
    pub doc_company: String,
    pub vessel_count: usize,
    pub vessels: Vec<String>,
}
