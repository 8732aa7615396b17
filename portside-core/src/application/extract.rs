// portside-core/src/application/extract.rs
//
// Extractor: strict decode of the raw documents plus the declared-count
// constraint check. Extraction reshapes and validates shape only — it
// computes nothing. The wire structs below ARE the declared field mapping:
// raw snake_case names in, normalized entities out (in transform).

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::error::DomainError;
use crate::domain::model::Severity;
use crate::error::PortsideError;
use crate::infrastructure::fs::read_json_file;

// --- WIRE: FLEET ROSTER ---

#[derive(Debug, Deserialize)]
pub struct RawFleetDocument {
    #[allow(dead_code)]
    pub schema_version: String,
    #[serde(default)]
    pub fleet_name: String,
    pub total_vessels: usize,
    pub vessels: Vec<RawVessel>,
}

#[derive(Debug, Deserialize)]
pub struct RawVessel {
    pub vessel_id: String,
    pub vessel_name: String,
    pub imo_no: Option<String>,
    pub vessel_type: String,
    pub owner: String,
    pub doc_company: String,
    pub flag_state: String,
    pub class_society: String,
    pub built_year: i32,
    pub dwt: Option<u64>,
    pub historical_metrics: RawHistoricalMetrics,
}

/// Nested block in the roster; flattened away by the vessel transform.
#[derive(Debug, Deserialize)]
pub struct RawHistoricalMetrics {
    pub total_inspections: u32,
    pub total_deficiencies: u32,
    pub detention_count: u32,
    pub clean_inspections: u32,
}

// --- WIRE: INSPECTION LOG ---

#[derive(Debug, Deserialize)]
pub struct RawInspectionDocument {
    #[allow(dead_code)]
    pub schema_version: String,
    pub total_inspections: usize,
    pub inspections: Vec<RawInspection>,
}

#[derive(Debug, Deserialize)]
pub struct RawInspection {
    pub inspection_id: u32,
    pub vessel_name: String,
    pub inspection_date: NaiveDate,
    pub port: String,
    pub port_locode: String,
    pub country: String,
    pub mou_region: String,
    pub inspector: String,
    pub outcome: String,
    pub detention: bool,
    pub deficiency_count: u32,
    #[serde(default)]
    pub deficiencies: Vec<RawDeficiency>,
}

#[derive(Debug, Deserialize)]
pub struct RawDeficiency {
    pub code: String,
    pub category: String,
    pub severity: Severity,
    pub action_code: String,
}

// --- EXTRACTORS ---

pub async fn extract_fleet(
    path: &Path,
    expected_total: usize,
) -> Result<RawFleetDocument, PortsideError> {
    let doc: RawFleetDocument = read_json_file(path).await?;
    check_declared_total("vessel roster", doc.total_vessels, doc.vessels.len(), expected_total)?;
    Ok(doc)
}

pub async fn extract_inspections(
    path: &Path,
    expected_total: usize,
) -> Result<RawInspectionDocument, PortsideError> {
    let doc: RawInspectionDocument = read_json_file(path).await?;
    check_declared_total(
        "inspection log",
        doc.total_inspections,
        doc.inspections.len(),
        expected_total,
    )?;
    Ok(doc)
}

/// The document's declared total must match both its own payload and the
/// configured expectation. Either mismatch is fatal with no partial result.
fn check_declared_total(
    table: &str,
    declared: usize,
    actual: usize,
    expected: usize,
) -> Result<(), PortsideError> {
    if declared != actual {
        return Err(DomainError::ExtractionConstraint {
            table: table.to_string(),
            declared,
            expected: actual,
        }
        .into());
    }
    if declared != expected {
        return Err(DomainError::ExtractionConstraint {
            table: table.to_string(),
            declared,
            expected,
        }
        .into());
    }
    Ok(())
}
