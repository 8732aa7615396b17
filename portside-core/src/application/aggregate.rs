// portside-core/src/application/aggregate.rs
//
// KPI Aggregator: pure reducers over the vessel master and inspection fact
// tables. Group-by counts and sums, zero-guarded rates, the configurable
// risk model, nothing else — no I/O, no mutation of the inputs.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::model::{Inspection, Vessel};
use crate::domain::risk::{
    self, PerformanceTrend, RiskAssessment, RiskCategory, RiskConfig, TrendSample, VesselHistory,
};
use crate::domain::stats::{mean, percentage, round1};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetOverview {
    pub total_vessels: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_owner: BTreeMap<String, usize>,
    pub by_doc_company: BTreeMap<String, usize>,
    pub average_age_years: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PscPerformance {
    pub total_inspections: usize,
    pub total_deficiencies: usize,
    pub detention_count: usize,
    pub clean_count: usize,
    pub detention_rate: f64,
    pub clean_rate: f64,
    pub avg_deficiencies_per_inspection: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselPerformance {
    pub vessel_id: String,
    pub vessel_name: String,
    pub inspections: u32,
    pub deficiencies: u32,
    pub detentions: u32,
    pub clean_inspections: u32,
    pub avg_deficiencies: f64,
    pub detention_rate: f64,
    pub clean_rate: f64,
    pub performance_trend: PerformanceTrend,
}

/// Shared rollup shape for owner and DOC-company groupings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPerformance {
    pub name: String,
    pub vessels: usize,
    pub inspections: usize,
    pub deficiencies: usize,
    pub detentions: usize,
    pub detention_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouPerformance {
    pub mou_region: String,
    pub inspections: usize,
    pub deficiencies: usize,
    pub detentions: usize,
    pub detention_rate: f64,
    pub clean_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub year: i32,
    pub month: u32,
    pub inspections: usize,
    pub deficiencies: usize,
    pub detentions: usize,
    pub clean_inspections: usize,
}

#[derive(Debug, Clone)]
pub struct KpiBundle {
    pub fleet_overview: FleetOverview,
    pub psc_performance: PscPerformance,
    pub vessel_performance: Vec<VesselPerformance>,
    pub owner_performance: Vec<GroupPerformance>,
    pub doc_company_performance: Vec<GroupPerformance>,
    pub mou_performance: Vec<MouPerformance>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub risk_indicators: Vec<RiskAssessment>,
}

pub fn aggregate(
    vessels: &[Vessel],
    inspections: &[Inspection],
    risk_config: &RiskConfig,
    as_of: NaiveDate,
) -> KpiBundle {
    let vessel_performance = vessel_performance(vessels, inspections);

    KpiBundle {
        fleet_overview: fleet_overview(vessels, as_of),
        psc_performance: psc_performance(inspections),
        owner_performance: group_performance(vessels, inspections, |v| v.owner.clone()),
        doc_company_performance: group_performance(vessels, inspections, |v| v.doc_company.clone()),
        mou_performance: mou_performance(inspections),
        monthly_trends: monthly_trends(inspections),
        risk_indicators: risk_indicators(vessels, &vessel_performance, risk_config, as_of),
        vessel_performance,
    }
}

fn fleet_overview(vessels: &[Vessel], as_of: NaiveDate) -> FleetOverview {
    let mut by_type = BTreeMap::new();
    let mut by_owner = BTreeMap::new();
    let mut by_doc_company = BTreeMap::new();
    for v in vessels {
        *by_type.entry(v.vessel_type.clone()).or_insert(0) += 1;
        *by_owner.entry(v.owner.clone()).or_insert(0) += 1;
        *by_doc_company.entry(v.doc_company.clone()).or_insert(0) += 1;
    }
    let average_age_years = if vessels.is_empty() {
        0.0
    } else {
        round1(
            vessels.iter().map(|v| age_years(v, as_of)).sum::<f64>() / vessels.len() as f64,
        )
    };
    FleetOverview {
        total_vessels: vessels.len(),
        by_type,
        by_owner,
        by_doc_company,
        average_age_years,
    }
}

fn psc_performance(inspections: &[Inspection]) -> PscPerformance {
    let total = inspections.len();
    let deficiencies: u32 = inspections.iter().map(|i| i.deficiency_count).sum();
    let detentions = inspections.iter().filter(|i| i.detention).count();
    let clean = inspections.iter().filter(|i| i.is_clean_inspection).count();
    PscPerformance {
        total_inspections: total,
        total_deficiencies: deficiencies as usize,
        detention_count: detentions,
        clean_count: clean,
        detention_rate: percentage(detentions as u32, total as u32),
        clean_rate: percentage(clean as u32, total as u32),
        avg_deficiencies_per_inspection: mean(deficiencies, total as u32),
    }
}

fn vessel_performance(vessels: &[Vessel], inspections: &[Inspection]) -> Vec<VesselPerformance> {
    vessels
        .iter()
        .map(|vessel| {
            let mut own: Vec<&Inspection> = inspections
                .iter()
                .filter(|i| i.vessel_name == vessel.name)
                .collect();
            own.sort_by_key(|i| (i.inspection_date, i.inspection_id));

            let count = own.len() as u32;
            let deficiencies: u32 = own.iter().map(|i| i.deficiency_count).sum();
            let detentions = own.iter().filter(|i| i.detention).count() as u32;
            let clean = own.iter().filter(|i| i.is_clean_inspection).count() as u32;
            let samples: Vec<TrendSample> = own
                .iter()
                .map(|i| TrendSample {
                    detention: i.detention,
                    deficiencies: i.deficiency_count,
                })
                .collect();

            VesselPerformance {
                vessel_id: vessel.vessel_id.clone(),
                vessel_name: vessel.name.clone(),
                inspections: count,
                deficiencies,
                detentions,
                clean_inspections: clean,
                avg_deficiencies: mean(deficiencies, count),
                detention_rate: percentage(detentions, count),
                clean_rate: percentage(clean, count),
                performance_trend: risk::classify_trend(&samples),
            }
        })
        .collect()
}

fn group_performance(
    vessels: &[Vessel],
    inspections: &[Inspection],
    key: impl Fn(&Vessel) -> String,
) -> Vec<GroupPerformance> {
    let mut groups: BTreeMap<String, GroupPerformance> = BTreeMap::new();
    for vessel in vessels {
        let entry = groups
            .entry(key(vessel))
            .or_insert_with_key(|name| GroupPerformance {
                name: name.clone(),
                vessels: 0,
                inspections: 0,
                deficiencies: 0,
                detentions: 0,
                detention_rate: 0.0,
            });
        entry.vessels += 1;
        for inspection in inspections.iter().filter(|i| i.vessel_name == vessel.name) {
            entry.inspections += 1;
            entry.deficiencies += inspection.deficiency_count as usize;
            if inspection.detention {
                entry.detentions += 1;
            }
        }
    }
    groups
        .into_values()
        .map(|mut g| {
            g.detention_rate = percentage(g.detentions as u32, g.inspections as u32);
            g
        })
        .collect()
}

fn mou_performance(inspections: &[Inspection]) -> Vec<MouPerformance> {
    let mut regions: BTreeMap<String, (usize, usize, usize, usize)> = BTreeMap::new();
    for i in inspections {
        let entry = regions.entry(i.mou_region.clone()).or_default();
        entry.0 += 1;
        entry.1 += i.deficiency_count as usize;
        if i.detention {
            entry.2 += 1;
        }
        if i.is_clean_inspection {
            entry.3 += 1;
        }
    }
    regions
        .into_iter()
        .map(
            |(mou_region, (inspections, deficiencies, detentions, clean))| MouPerformance {
                mou_region,
                inspections,
                deficiencies,
                detentions,
                detention_rate: percentage(detentions as u32, inspections as u32),
                clean_rate: percentage(clean as u32, inspections as u32),
            },
        )
        .collect()
}

fn monthly_trends(inspections: &[Inspection]) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<(i32, u32), MonthlyTrend> = BTreeMap::new();
    for i in inspections {
        let entry = months.entry((i.year, i.month)).or_insert(MonthlyTrend {
            year: i.year,
            month: i.month,
            inspections: 0,
            deficiencies: 0,
            detentions: 0,
            clean_inspections: 0,
        });
        entry.inspections += 1;
        entry.deficiencies += i.deficiency_count as usize;
        if i.detention {
            entry.detentions += 1;
        }
        if i.is_clean_inspection {
            entry.clean_inspections += 1;
        }
    }
    months.into_values().collect()
}

fn risk_indicators(
    vessels: &[Vessel],
    performance: &[VesselPerformance],
    config: &RiskConfig,
    as_of: NaiveDate,
) -> Vec<RiskAssessment> {
    let mut assessments: Vec<RiskAssessment> = vessels
        .iter()
        .map(|vessel| {
            let history = performance
                .iter()
                .find(|p| p.vessel_id == vessel.vessel_id)
                .filter(|p| p.inspections > 0)
                .map(|p| VesselHistory {
                    inspections: p.inspections,
                    avg_deficiencies: p.avg_deficiencies,
                    detention_rate: p.detention_rate,
                    clean_rate: p.clean_rate,
                    trend: p.performance_trend,
                });

            let age = round1(risk::age_factor(age_years(vessel, as_of)));
            let hist = round1(risk::history_factor(history.as_ref()));
            let regional = round1(risk::regional_factor(
                config,
                &vessel.flag_state,
                &vessel.vessel_type,
                &vessel.class_society,
            ));
            let score = risk::risk_score(config, age, hist, regional);

            RiskAssessment {
                vessel_id: vessel.vessel_id.clone(),
                vessel_name: vessel.name.clone(),
                risk_score: score,
                risk_category: RiskCategory::from_score(score),
                age_factor: age,
                history_factor: hist,
                regional_factor: regional,
            }
        })
        .collect();

    // Stable, fully specified ordering: score descending, vessel id ascending.
    assessments.sort_by(|a, b| {
        b.risk_score
            .total_cmp(&a.risk_score)
            .then_with(|| a.vessel_id.cmp(&b.vessel_id))
    });
    assessments
}

fn age_years(vessel: &Vessel, as_of: NaiveDate) -> f64 {
    let built = NaiveDate::from_ymd_opt(vessel.built_year, 1, 1).unwrap_or(as_of);
    (as_of - built).num_days().max(0) as f64 / 365.25
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::model::OUTCOME_CLEAN;
    use chrono::Datelike;

    fn vessel(id: &str, name: &str, owner: &str, doc: &str, vtype: &str, built: i32) -> Vessel {
        Vessel {
            vessel_id: id.into(),
            name: name.into(),
            imo_number: None,
            vessel_type: vtype.into(),
            owner: owner.into(),
            doc_company: doc.into(),
            flag_state: "Panama".into(),
            class_society: "DNV".into(),
            built_year: built,
            dwt: None,
            total_inspections: 0,
            total_deficiencies: 0,
            detention_count: 0,
            clean_inspections: 0,
            detention_rate: 0.0,
            clean_rate: 0.0,
        }
    }

    fn inspection(
        id: u32,
        vessel_name: &str,
        date: (i32, u32, u32),
        detention: bool,
        defs: u32,
    ) -> Inspection {
        let d = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        Inspection {
            inspection_id: id,
            vessel_name: vessel_name.into(),
            inspection_date: d,
            year: date.0,
            quarter: (date.1 - 1) / 3 + 1,
            month: date.1,
            week: d.iso_week().week(),
            port: "Busan".into(),
            port_locode: Some("KRPUS".into()),
            country: "South Korea".into(),
            mou_region: "Tokyo MoU".into(),
            inspector: "Officer".into(),
            outcome: if defs == 0 { OUTCOME_CLEAN.into() } else { "Deficiencies Found".into() },
            detention,
            deficiency_count: defs,
            is_clean_inspection: defs == 0,
            is_critical_deficiency: false,
            deficiencies: vec![],
        }
    }

    fn demo_fleet() -> (Vec<Vessel>, Vec<Inspection>) {
        let vessels = vec![
            vessel("V-001", "Pacific Carrier", "Aurora Shipping", "Meridian", "PC(T)C", 2010),
            vessel("V-002", "Pacific Glory", "Aurora Shipping", "Meridian", "PC(T)C", 2018),
            vessel("V-003", "Coral Trader", "Baltica Marine", "Northgate", "Bulk", 2001),
        ];
        let inspections = vec![
            inspection(1, "Pacific Carrier", (2025, 1, 14), false, 3),
            inspection(2, "Pacific Carrier", (2025, 3, 2), false, 0),
            inspection(3, "Pacific Glory", (2025, 2, 20), false, 0),
            inspection(4, "Coral Trader", (2025, 4, 11), true, 5),
            inspection(5, "Coral Trader", (2025, 5, 28), false, 4),
        ];
        (vessels, inspections)
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    #[test]
    fn test_psc_performance_reference_scenario() {
        let (_, inspections) = demo_fleet();
        let kpi = psc_performance(&inspections);
        assert_eq!(kpi.total_inspections, 5);
        assert_eq!(kpi.total_deficiencies, 12);
        assert_eq!(kpi.detention_rate, 20.0);
        assert_eq!(kpi.clean_rate, 40.0);
        assert_eq!(kpi.avg_deficiencies_per_inspection, 2.4);
    }

    #[test]
    fn test_fleet_overview_composition() {
        let (vessels, _) = demo_fleet();
        let overview = fleet_overview(&vessels, as_of());
        assert_eq!(overview.total_vessels, 3);
        assert_eq!(overview.by_owner["Aurora Shipping"], 2);
        assert_eq!(overview.by_owner["Baltica Marine"], 1);
        assert_eq!(overview.by_type["PC(T)C"], 2);
        assert_eq!(overview.by_doc_company["Northgate"], 1);
        assert!(overview.average_age_years > 0.0);
    }

    #[test]
    fn test_vessel_performance_and_trends() {
        let (vessels, inspections) = demo_fleet();
        let perf = vessel_performance(&vessels, &inspections);

        let carrier = perf.iter().find(|p| p.vessel_id == "V-001").unwrap();
        assert_eq!(carrier.inspections, 2);
        assert_eq!(carrier.deficiencies, 3);
        assert_eq!(carrier.clean_rate, 50.0);
        // 3 deficiencies then a clean inspection
        assert_eq!(carrier.performance_trend, PerformanceTrend::Improving);

        let glory = perf.iter().find(|p| p.vessel_id == "V-002").unwrap();
        assert_eq!(glory.performance_trend, PerformanceTrend::Excellent);

        let trader = perf.iter().find(|p| p.vessel_id == "V-003").unwrap();
        assert_eq!(trader.detention_rate, 50.0);
        assert_eq!(trader.avg_deficiencies, 4.5);
    }

    #[test]
    fn test_vessel_without_inspections_has_zero_rates() {
        let vessels = vec![vessel("V-009", "Idle Queen", "Aurora Shipping", "Meridian", "Bulk", 2015)];
        let perf = vessel_performance(&vessels, &[]);
        assert_eq!(perf[0].inspections, 0);
        assert_eq!(perf[0].detention_rate, 0.0);
        assert_eq!(perf[0].clean_rate, 0.0);
        assert_eq!(perf[0].performance_trend, PerformanceTrend::Stable);
    }

    #[test]
    fn test_owner_rollup() {
        let (vessels, inspections) = demo_fleet();
        let owners = group_performance(&vessels, &inspections, |v| v.owner.clone());
        assert_eq!(owners.len(), 2);
        let aurora = owners.iter().find(|g| g.name == "Aurora Shipping").unwrap();
        assert_eq!(aurora.vessels, 2);
        assert_eq!(aurora.inspections, 3);
        assert_eq!(aurora.deficiencies, 3);
        assert_eq!(aurora.detentions, 0);
        let baltica = owners.iter().find(|g| g.name == "Baltica Marine").unwrap();
        assert_eq!(baltica.detention_rate, 50.0);
    }

    #[test]
    fn test_monthly_trends_sorted_chronologically() {
        let (_, inspections) = demo_fleet();
        let months = monthly_trends(&inspections);
        let keys: Vec<(i32, u32)> = months.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(keys, vec![(2025, 1), (2025, 2), (2025, 3), (2025, 4), (2025, 5)]);
        assert_eq!(months[3].detentions, 1);
        assert_eq!(months[3].deficiencies, 5);
    }

    #[test]
    fn test_risk_ranking_order_and_tiebreak() {
        let (vessels, inspections) = demo_fleet();
        let bundle = aggregate(&vessels, &inspections, &RiskConfig::default(), as_of());
        let risks = &bundle.risk_indicators;
        assert_eq!(risks.len(), 3);
        // Oldest vessel with the detention history must rank first.
        assert_eq!(risks[0].vessel_id, "V-003");
        // Descending scores, id ascending on ties.
        for pair in risks.windows(2) {
            assert!(
                pair[0].risk_score > pair[1].risk_score
                    || (pair[0].risk_score == pair[1].risk_score
                        && pair[0].vessel_id < pair[1].vessel_id)
            );
        }
    }
}
