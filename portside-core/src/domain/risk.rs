// portside-core/src/domain/risk.rs
//
// Per-vessel risk model: weighted combination of an age factor, a
// historical-deficiency factor and a regional (flag/type/class) factor.
// Weights and modifier maps come from configuration so operators can tune
// the policy without touching the aggregation code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::stats::round1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskWeights {
    pub age: f64,
    pub history: f64,
    pub regional: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            age: 0.4,
            history: 0.4,
            regional: 0.2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RiskConfig {
    #[serde(default)]
    pub weights: RiskWeights,
    /// Flag-state multipliers applied to the regional base risk (default 1.0).
    #[serde(default)]
    pub flag_modifiers: BTreeMap<String, f64>,
    #[serde(default)]
    pub type_modifiers: BTreeMap<String, f64>,
    #[serde(default)]
    pub class_modifiers: BTreeMap<String, f64>,
}

/// Classification of a vessel's recent PSC performance, derived from its
/// inspection history (oldest to newest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTrend {
    Excellent,
    Improving,
    Stable,
    Deteriorating,
    Critical,
}

impl PerformanceTrend {
    pub fn modifier(self) -> f64 {
        match self {
            PerformanceTrend::Excellent => 0.7,
            PerformanceTrend::Improving => 0.8,
            PerformanceTrend::Stable => 1.0,
            PerformanceTrend::Deteriorating => 1.3,
            PerformanceTrend::Critical => 1.5,
        }
    }
}

/// One inspection reduced to what the trend rule needs. Slices passed to
/// [`classify_trend`] must be ordered oldest first.
#[derive(Debug, Clone, Copy)]
pub struct TrendSample {
    pub detention: bool,
    pub deficiencies: u32,
}

/// All clean -> Excellent. A detention in the recent half -> Critical.
/// Otherwise the recent-half deficiency rate against the older half decides
/// (±20% band), Stable when history is too short to split.
pub fn classify_trend(samples: &[TrendSample]) -> PerformanceTrend {
    if samples.is_empty() {
        return PerformanceTrend::Stable;
    }
    if samples.iter().all(|s| s.deficiencies == 0 && !s.detention) {
        return PerformanceTrend::Excellent;
    }

    let split = samples.len() / 2;
    let (older, recent) = samples.split_at(split);
    if recent.iter().any(|s| s.detention) {
        return PerformanceTrend::Critical;
    }
    if older.is_empty() {
        return PerformanceTrend::Stable;
    }

    let rate = |part: &[TrendSample]| {
        part.iter().map(|s| s.deficiencies as f64).sum::<f64>() / part.len() as f64
    };
    let older_rate = rate(older);
    let recent_rate = rate(recent);

    if older_rate == 0.0 {
        return if recent_rate > 0.0 {
            PerformanceTrend::Deteriorating
        } else {
            PerformanceTrend::Stable
        };
    }
    let ratio = recent_rate / older_rate;
    if ratio <= 0.8 {
        PerformanceTrend::Improving
    } else if ratio >= 1.2 {
        PerformanceTrend::Deteriorating
    } else {
        PerformanceTrend::Stable
    }
}

/// Aggregated inspection history for one vessel, as the history factor
/// consumes it. Rates are percentages (0-100).
#[derive(Debug, Clone)]
pub struct VesselHistory {
    pub inspections: u32,
    pub avg_deficiencies: f64,
    pub detention_rate: f64,
    pub clean_rate: f64,
    pub trend: PerformanceTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskCategory {
    pub fn from_score(score: f64) -> Self {
        if score <= 25.0 {
            RiskCategory::Low
        } else if score <= 50.0 {
            RiskCategory::Medium
        } else if score <= 75.0 {
            RiskCategory::High
        } else {
            RiskCategory::Critical
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub vessel_id: String,
    pub vessel_name: String,
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    pub age_factor: f64,
    pub history_factor: f64,
    pub regional_factor: f64,
}

// Age bands: (lower bound, upper bound, base factor). A vessel's score is
// interpolated linearly inside its band; 35+ years saturates at 100.
const AGE_BANDS: [(f64, f64, f64); 5] = [
    (0.0, 5.0, 0.1),
    (5.0, 15.0, 0.25),
    (15.0, 25.0, 0.5),
    (25.0, 35.0, 0.75),
    (35.0, 100.0, 1.0),
];

pub fn age_factor(age_years: f64) -> f64 {
    for (lo, hi, base) in AGE_BANDS {
        if age_years >= lo && age_years < hi {
            if hi >= 100.0 {
                return base * 100.0;
            }
            let position = (age_years - lo) / (hi - lo);
            return base * 100.0 * (0.5 + 0.5 * position);
        }
    }
    100.0
}

pub fn history_factor(history: Option<&VesselHistory>) -> f64 {
    let Some(h) = history else {
        return 50.0; // moderate risk with no inspection history
    };
    if h.inspections == 0 {
        return 50.0;
    }
    let defect_risk = (h.avg_deficiencies * 8.0).min(70.0);
    let detention_risk = h.detention_rate / 100.0 * 25.0;
    let clean_bonus = h.clean_rate / 100.0 * 15.0;
    ((defect_risk + detention_risk - clean_bonus) * h.trend.modifier()).clamp(0.0, 100.0)
}

pub fn regional_factor(config: &RiskConfig, flag: &str, vessel_type: &str, class: &str) -> f64 {
    let get = |map: &BTreeMap<String, f64>, key: &str| map.get(key).copied().unwrap_or(1.0);
    let base = 50.0;
    (base * get(&config.flag_modifiers, flag)
        * get(&config.type_modifiers, vessel_type)
        * get(&config.class_modifiers, class))
    .clamp(0.0, 100.0)
}

pub fn risk_score(config: &RiskConfig, age: f64, history: f64, regional: f64) -> f64 {
    let w = &config.weights;
    round1((age * w.age + history * w.history + regional * w.regional).clamp(0.0, 100.0))
}
