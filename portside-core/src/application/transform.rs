// portside-core/src/application/transform.rs
//
// Transformer: raw wire records -> normalized entities with computed fields.
// Reference misses degrade to the Unknown sentinel and a diagnostic entry;
// structural problems (duplicate ids, count mismatches) are TransformErrors
// carrying the offending record identifier.

use std::collections::{BTreeMap, HashSet};

use crate::application::extract::{RawFleetDocument, RawInspection, RawInspectionDocument};
use crate::domain::calendar;
use crate::domain::error::DomainError;
use crate::domain::model::{
    Deficiency, DeficiencySummary, DocCompanyMaster, Inspection, OwnerMaster, ReferenceMiss,
    ReferenceSet, Severity, UNKNOWN, Vessel,
};
use crate::domain::stats::percentage;
use crate::error::PortsideError;

pub fn transform_vessels(doc: &RawFleetDocument) -> Result<Vec<Vessel>, PortsideError> {
    let mut seen = HashSet::new();
    let mut vessels = Vec::with_capacity(doc.vessels.len());

    for raw in &doc.vessels {
        if !seen.insert(raw.vessel_id.clone()) {
            return Err(DomainError::Transform {
                record: format!("vessel {}", raw.vessel_id),
                reason: "duplicate vessel id".into(),
            }
            .into());
        }

        let m = &raw.historical_metrics;
        vessels.push(Vessel {
            vessel_id: raw.vessel_id.clone(),
            name: raw.vessel_name.clone(),
            imo_number: raw.imo_no.clone(),
            vessel_type: raw.vessel_type.clone(),
            // Verbatim copies: upstream is pre-cleaned, any drift must reach
            // the validator instead of being papered over here.
            owner: raw.owner.clone(),
            doc_company: raw.doc_company.clone(),
            flag_state: raw.flag_state.clone(),
            class_society: raw.class_society.clone(),
            built_year: raw.built_year,
            dwt: raw.dwt,
            total_inspections: m.total_inspections,
            total_deficiencies: m.total_deficiencies,
            detention_count: m.detention_count,
            clean_inspections: m.clean_inspections,
            detention_rate: percentage(m.detention_count, m.total_inspections),
            clean_rate: percentage(m.clean_inspections, m.total_inspections),
        });
    }

    Ok(vessels)
}

#[derive(Debug, Default)]
pub struct TransformedInspections {
    pub inspections: Vec<Inspection>,
    pub deficiencies: Vec<Deficiency>,
    pub misses: Vec<ReferenceMiss>,
}

pub fn transform_inspections(
    doc: &RawInspectionDocument,
    refs: &ReferenceSet,
) -> Result<TransformedInspections, PortsideError> {
    let mut out = TransformedInspections::default();
    let mut seen = HashSet::new();
    // Synthetic deficiency ids are sequential in document order across the
    // whole log, starting at 1.
    let mut next_deficiency_id: u32 = 1;

    for raw in &doc.inspections {
        if !seen.insert(raw.inspection_id) {
            return Err(DomainError::Transform {
                record: format!("inspection {}", raw.inspection_id),
                reason: "duplicate inspection id".into(),
            }
            .into());
        }
        if raw.deficiency_count as usize != raw.deficiencies.len() {
            return Err(DomainError::Transform {
                record: format!("inspection {}", raw.inspection_id),
                reason: format!(
                    "declared deficiency_count {} disagrees with {} embedded records",
                    raw.deficiency_count,
                    raw.deficiencies.len()
                ),
            }
            .into());
        }

        let mut summaries = Vec::with_capacity(raw.deficiencies.len());
        for raw_def in &raw.deficiencies {
            let id = next_deficiency_id;
            next_deficiency_id += 1;

            let priority = match refs.deficiency_codes.get(&raw_def.code) {
                Some(code) => code.priority.clone(),
                None => {
                    record_miss(&mut out.misses, refs.deficiency_codes.is_empty(), raw, "deficiency_codes", &raw_def.code);
                    UNKNOWN.to_string()
                }
            };

            let (urgency_level, timeframe_hours, detention_related) =
                match refs.action_codes.get(&raw_def.action_code) {
                    Some(action) => (
                        action.urgency_level.clone(),
                        action.timeframe_hours,
                        action.detention_related,
                    ),
                    None => {
                        record_miss(&mut out.misses, refs.action_codes.is_empty(), raw, "action_codes", &raw_def.action_code);
                        (UNKNOWN.to_string(), None, false)
                    }
                };

            summaries.push(DeficiencySummary {
                deficiency_id: id,
                code: raw_def.code.clone(),
                severity: raw_def.severity,
            });
            out.deficiencies.push(Deficiency {
                deficiency_id: id,
                inspection_id: raw.inspection_id,
                vessel_name: raw.vessel_name.clone(),
                code: raw_def.code.clone(),
                category: raw_def.category.clone(),
                severity: raw_def.severity,
                action_code: raw_def.action_code.clone(),
                priority,
                urgency_level,
                timeframe_hours,
                detention_related,
            });
        }

        let port_locode = if refs.ports.is_empty() || refs.ports.contains_key(&raw.port_locode) {
            Some(raw.port_locode.clone())
        } else {
            record_miss(&mut out.misses, false, raw, "ports", &raw.port_locode);
            None
        };
        if !refs.mou_regions.is_empty() && !refs.mou_regions.contains_key(&raw.mou_region) {
            record_miss(&mut out.misses, false, raw, "mou_regions", &raw.mou_region);
        }

        let parts = calendar::explode(raw.inspection_date);
        out.inspections.push(Inspection {
            inspection_id: raw.inspection_id,
            vessel_name: raw.vessel_name.clone(),
            inspection_date: raw.inspection_date,
            year: parts.year,
            quarter: parts.quarter,
            month: parts.month,
            week: parts.week,
            port: raw.port.clone(),
            port_locode,
            country: raw.country.clone(),
            mou_region: raw.mou_region.clone(),
            inspector: raw.inspector.clone(),
            outcome: raw.outcome.clone(),
            // Source of truth, copied through unchanged
            detention: raw.detention,
            deficiency_count: raw.deficiency_count,
            is_clean_inspection: raw.deficiency_count == 0,
            is_critical_deficiency: raw
                .deficiencies
                .iter()
                .any(|d| d.severity == Severity::Critical),
            deficiencies: summaries,
        });
    }

    Ok(out)
}

/// Owner master rows, one per distinct owner in vessel-master order.
pub fn owner_masters(vessels: &[Vessel]) -> Vec<OwnerMaster> {
    let mut owners: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for v in vessels {
        owners.entry(v.owner.clone()).or_default().push(v.name.clone());
    }
    owners
        .into_iter()
        .map(|(owner, vessels)| OwnerMaster {
            owner,
            vessel_count: vessels.len(),
            vessels,
        })
        .collect()
}

pub fn doc_company_masters(vessels: &[Vessel]) -> Vec<DocCompanyMaster> {
    let mut companies: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for v in vessels {
        companies
            .entry(v.doc_company.clone())
            .or_default()
            .push(v.name.clone());
    }
    companies
        .into_iter()
        .map(|(doc_company, vessels)| DocCompanyMaster {
            doc_company,
            vessel_count: vessels.len(),
            vessels,
        })
        .collect()
}

/// An empty reference table means the file was absent — already warned at
/// load time, so per-record misses against it would only be noise.
fn record_miss(
    misses: &mut Vec<ReferenceMiss>,
    table_is_empty: bool,
    inspection: &RawInspection,
    table: &str,
    key: &str,
) {
    if table_is_empty {
        return;
    }
    tracing::warn!(table, key, inspection = inspection.inspection_id, "Reference lookup miss");
    misses.push(ReferenceMiss {
        table: table.to_string(),
        key: key.to_string(),
        record: format!("inspection {}", inspection.inspection_id),
    });
}
