// portside-core/src/domain/model/inspection.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Deficiency severity, ordered so that `Critical > High > Medium > Low`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Outcome label used by the clean-outcome consistency rule.
pub const OUTCOME_CLEAN: &str = "Clean";

/// Normalized inspection fact row. Created once per run from the raw
/// inspection log, never mutated after transform.
///
/// `detention` is the source of truth copied through unchanged; the
/// detention-action consistency rule checks it against the deficiency table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub inspection_id: u32,
    /// Soft reference into the vessel master; must resolve.
    pub vessel_name: String,
    pub inspection_date: NaiveDate,
    pub year: i32,
    pub quarter: u32,
    pub month: u32,
    pub week: u32,
    pub port: String,
    pub port_locode: Option<String>,
    pub country: String,
    pub mou_region: String,
    pub inspector: String,
    pub outcome: String,
    pub detention: bool,
    pub deficiency_count: u32,
    pub is_clean_inspection: bool,
    pub is_critical_deficiency: bool,
    /// Ordered summaries of the owned deficiencies, in document order.
    pub deficiencies: Vec<DeficiencySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeficiencySummary {
    pub deficiency_id: u32,
    pub code: String,
    pub severity: Severity,
}

/// Normalized deficiency fact row. Owned by exactly one inspection; the
/// synthetic id is sequential in document order across the whole log.
///
/// `priority` comes from the deficiency-code table, the urgency block from
/// the action-code table. Unresolved lookups hold the Unknown sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deficiency {
    pub deficiency_id: u32,
    pub inspection_id: u32,
    pub vessel_name: String,
    pub code: String,
    pub category: String,
    pub severity: Severity,
    pub action_code: String,
    pub priority: String,
    pub urgency_level: String,
    pub timeframe_hours: Option<u32>,
    pub detention_related: bool,
}
