// portside-core/src/domain/rules.rs
//
// Business-rule validator. Every check runs and every discrepancy is
// recorded before pass/fail is decided, so the operator sees the full
// picture in one pass. The orchestrator treats a non-empty report as fatal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::constraints::FleetConstraints;
use crate::domain::model::{Deficiency, Inspection, OUTCOME_CLEAN, Vessel};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Stable rule identifier, e.g. "vessel.byDocCompany".
    pub rule: String,
    /// The entity or key the rule fired on.
    pub subject: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub checks_run: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    fn check(&mut self, rule: &str, subject: &str, expected: impl ToString, actual: impl ToString) {
        self.checks_run += 1;
        let expected = expected.to_string();
        let actual = actual.to_string();
        if expected != actual {
            self.violations.push(Violation {
                rule: rule.to_string(),
                subject: subject.to_string(),
                expected,
                actual,
            });
        }
    }
}

pub fn validate(
    vessels: &[Vessel],
    inspections: &[Inspection],
    deficiencies: &[Deficiency],
    constraints: &FleetConstraints,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    // --- FLEET COMPOSITION ---
    report.check(
        "vessel.total",
        "fleet",
        constraints.total_vessels,
        vessels.len(),
    );
    compare_breakdown(
        &mut report,
        "vessel.byOwner",
        &constraints.vessels_by_owner,
        &frequency(vessels.iter().map(|v| v.owner.as_str())),
    );
    compare_breakdown(
        &mut report,
        "vessel.byDocCompany",
        &constraints.vessels_by_doc_company,
        &frequency(vessels.iter().map(|v| v.doc_company.as_str())),
    );
    compare_breakdown(
        &mut report,
        "vessel.byType",
        &constraints.vessels_by_type,
        &frequency(vessels.iter().map(|v| v.vessel_type.as_str())),
    );

    // --- INSPECTION TOTALS ---
    report.check(
        "inspection.total",
        "fleet",
        constraints.total_inspections,
        inspections.len(),
    );
    report.check(
        "inspection.detentions",
        "fleet",
        constraints.total_detentions,
        inspections.iter().filter(|i| i.detention).count(),
    );
    report.check(
        "inspection.clean",
        "fleet",
        constraints.total_clean_inspections,
        inspections.iter().filter(|i| i.is_clean_inspection).count(),
    );

    // Sum of per-inspection counts must equal the deficiency table, and both
    // must match the configured total.
    let declared_sum: usize = inspections.iter().map(|i| i.deficiency_count as usize).sum();
    report.check(
        "deficiency.total",
        "fleet",
        constraints.total_deficiencies,
        deficiencies.len(),
    );
    report.check(
        "deficiency.sumMatchesTable",
        "fleet",
        deficiencies.len(),
        declared_sum,
    );

    // --- CROSS-TABLE CONSISTENCY ---
    let mut per_inspection: BTreeMap<u32, Vec<&Deficiency>> = BTreeMap::new();
    for def in deficiencies {
        per_inspection.entry(def.inspection_id).or_default().push(def);
    }

    for inspection in inspections {
        let subject = format!("inspection {}", inspection.inspection_id);
        let owned = per_inspection
            .get(&inspection.inspection_id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        report.check(
            "inspection.deficiencyCount",
            &subject,
            inspection.deficiency_count,
            owned.len(),
        );

        if inspection.detention {
            report.check(
                "inspection.detentionAction",
                &subject,
                "at least one detention-related action code",
                if owned.iter().any(|d| d.detention_related) {
                    "at least one detention-related action code"
                } else {
                    "none of the recorded action codes is detention-related"
                },
            );
        }

        if inspection.outcome == OUTCOME_CLEAN {
            report.check(
                "inspection.cleanOutcome",
                &subject,
                0u32,
                inspection.deficiency_count,
            );
        }

        report.check(
            "inspection.vesselRef",
            &subject,
            format!("vessel '{}' present in master", inspection.vessel_name),
            if vessels.iter().any(|v| v.name == inspection.vessel_name) {
                format!("vessel '{}' present in master", inspection.vessel_name)
            } else {
                format!("vessel '{}' missing from master", inspection.vessel_name)
            },
        );
    }

    // --- VESSEL PERFORMANCE RECOMPUTATION ---
    // The roster's flattened historical metrics are a claim; the inspection
    // facts are the source of truth.
    for vessel in vessels {
        let subject = format!("vessel {}", vessel.vessel_id);
        let own: Vec<&Inspection> = inspections
            .iter()
            .filter(|i| i.vessel_name == vessel.name)
            .collect();

        report.check(
            "vessel.recomputedInspections",
            &subject,
            vessel.total_inspections as usize,
            own.len(),
        );
        report.check(
            "vessel.recomputedDeficiencies",
            &subject,
            vessel.total_deficiencies as usize,
            own.iter().map(|i| i.deficiency_count as usize).sum::<usize>(),
        );
        report.check(
            "vessel.recomputedDetentions",
            &subject,
            vessel.detention_count as usize,
            own.iter().filter(|i| i.detention).count(),
        );
        report.check(
            "vessel.recomputedClean",
            &subject,
            vessel.clean_inspections as usize,
            own.iter().filter(|i| i.is_clean_inspection).count(),
        );
    }

    report
}

fn frequency<'a>(values: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut map = BTreeMap::new();
    for value in values {
        *map.entry(value.to_string()).or_insert(0) += 1;
    }
    map
}

/// Compare a configured breakdown against the observed one, both directions:
/// a key expected but absent (or off-count) is a violation, and so is an
/// observed key the configuration does not know — an unmapped owner or DOC
/// company is data drift, never something to default away.
fn compare_breakdown(
    report: &mut ValidationReport,
    rule: &str,
    expected: &BTreeMap<String, usize>,
    actual: &BTreeMap<String, usize>,
) {
    for (key, expected_count) in expected {
        report.check(
            rule,
            key,
            *expected_count,
            actual.get(key).copied().unwrap_or(0),
        );
    }
    for (key, actual_count) in actual {
        if !expected.contains_key(key) {
            report.check(rule, key, format!("not present ({key} is unmapped)"), actual_count);
        }
    }
}
