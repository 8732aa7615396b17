// portside-core/src/domain/model/reference.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// PSC action code: the coded disposition attached to a deficiency,
/// encoding the required remedial timeframe and urgency.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionCode {
    pub code: String,
    pub description: String,
    pub priority: String,
    pub urgency_level: String,
    pub timeframe_hours: Option<u32>,
    pub detention_related: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeficiencyCode {
    pub code: String,
    pub title: String,
    pub category: String,
    pub priority: String,
}

/// A Port State Control Memorandum of Understanding region.
#[derive(Debug, Clone, Deserialize)]
pub struct MouRegion {
    pub name: String,
    pub secretariat: String,
    pub member_states: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortEntry {
    pub locode: String,
    pub name: String,
    pub country: String,
}

/// Static lookup tables loaded once per run, keyed by their natural code.
/// A table missing on disk is simply empty here; a missing *key* at
/// enrichment time degrades to a sentinel and a [`ReferenceMiss`].
#[derive(Debug, Default, Clone)]
pub struct ReferenceSet {
    pub mou_regions: HashMap<String, MouRegion>,
    pub action_codes: HashMap<String, ActionCode>,
    pub deficiency_codes: HashMap<String, DeficiencyCode>,
    pub ports: HashMap<String, PortEntry>,
}

/// Sentinel used when a foreign-key lookup has no match.
pub const UNKNOWN: &str = "Unknown";

/// A tolerated foreign-key lookup failure, surfaced in the run report
/// but never fatal (in contrast to count mismatches).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceMiss {
    pub table: String,
    pub key: String,
    pub record: String,
}
