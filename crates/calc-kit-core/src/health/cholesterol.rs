//! Lipid panel classification and a point-based heart risk score.
//!
//! Covers:
//! 1. **Level classifiers** -- total, LDL, HDL (sex-specific), triglycerides
//!    and the total/HDL ratio, using fixed mg/dL cut-offs.
//! 2. **Risk score** -- additive points for age, lipids and clinical flags,
//!    bucketed into five tiers with fixed ten-year risk labels.
//! 3. **Friedewald estimate** -- LDL derived from TC, HDL and TG when no
//!    measured LDL is supplied.
//!
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::error::CalcKitError;
use crate::types::*;
use crate::CalcKitResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// mg/dL per mmol/L for cholesterol fractions.
const CHOLESTEROL_MMOL_FACTOR: Decimal = dec!(38.67);
/// mg/dL per mmol/L for triglycerides.
const TRIGLYCERIDE_MMOL_FACTOR: Decimal = dec!(88.57);
/// Friedewald is unreliable above this triglyceride level (mg/dL).
const FRIEDEWALD_TG_LIMIT: Decimal = dec!(400);

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CholesterolUnit {
    #[default]
    MgPerDl,
    MmolPerL,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TotalCholesterolLevel {
    Desirable,
    BorderlineHigh,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LdlLevel {
    Optimal,
    NearOptimal,
    BorderlineHigh,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HdlLevel {
    Low,
    Normal,
    HighProtective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriglycerideLevel {
    Normal,
    BorderlineHigh,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatioLevel {
    Ideal,
    Good,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl fmt::Display for TotalCholesterolLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TotalCholesterolLevel::Desirable => write!(f, "Desirable"),
            TotalCholesterolLevel::BorderlineHigh => write!(f, "Borderline High"),
            TotalCholesterolLevel::High => write!(f, "High"),
        }
    }
}

impl fmt::Display for LdlLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LdlLevel::Optimal => write!(f, "Optimal"),
            LdlLevel::NearOptimal => write!(f, "Near Optimal"),
            LdlLevel::BorderlineHigh => write!(f, "Borderline High"),
            LdlLevel::High => write!(f, "High"),
            LdlLevel::VeryHigh => write!(f, "Very High"),
        }
    }
}

impl fmt::Display for HdlLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HdlLevel::Low => write!(f, "Low"),
            HdlLevel::Normal => write!(f, "Normal"),
            HdlLevel::HighProtective => write!(f, "High (Protective)"),
        }
    }
}

impl fmt::Display for TriglycerideLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriglycerideLevel::Normal => write!(f, "Normal"),
            TriglycerideLevel::BorderlineHigh => write!(f, "Borderline High"),
            TriglycerideLevel::High => write!(f, "High"),
            TriglycerideLevel::VeryHigh => write!(f, "Very High"),
        }
    }
}

impl fmt::Display for RatioLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioLevel::Ideal => write!(f, "Ideal"),
            RatioLevel::Good => write!(f, "Good"),
            RatioLevel::High => write!(f, "High"),
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::VeryLow => write!(f, "Very Low"),
            RiskTier::Low => write!(f, "Low"),
            RiskTier::Moderate => write!(f, "Moderate"),
            RiskTier::High => write!(f, "High"),
            RiskTier::VeryHigh => write!(f, "Very High"),
        }
    }
}

impl RiskTier {
    fn from_points(points: u32) -> Self {
        match points {
            0..=2 => RiskTier::VeryLow,
            3..=4 => RiskTier::Low,
            5..=6 => RiskTier::Moderate,
            7..=8 => RiskTier::High,
            _ => RiskTier::VeryHigh,
        }
    }

    /// Approximate ten-year cardiovascular risk band.
    pub fn ten_year_risk(&self) -> &'static str {
        match self {
            RiskTier::VeryLow => "<5%",
            RiskTier::Low => "5-10%",
            RiskTier::Moderate => "10-20%",
            RiskTier::High => "20-30%",
            RiskTier::VeryHigh => ">30%",
        }
    }
}

// ---------------------------------------------------------------------------
// Classifiers (mg/dL)
// ---------------------------------------------------------------------------

pub fn classify_total(total: Decimal) -> TotalCholesterolLevel {
    if total < dec!(200) {
        TotalCholesterolLevel::Desirable
    } else if total < dec!(240) {
        TotalCholesterolLevel::BorderlineHigh
    } else {
        TotalCholesterolLevel::High
    }
}

pub fn classify_ldl(ldl: Decimal) -> LdlLevel {
    if ldl < dec!(100) {
        LdlLevel::Optimal
    } else if ldl < dec!(130) {
        LdlLevel::NearOptimal
    } else if ldl < dec!(160) {
        LdlLevel::BorderlineHigh
    } else if ldl < dec!(190) {
        LdlLevel::High
    } else {
        LdlLevel::VeryHigh
    }
}

/// HDL is the "good" fraction: higher is better, and the low cut-off
/// depends on sex.
pub fn classify_hdl(hdl: Decimal, sex: Sex) -> HdlLevel {
    let low_cutoff = match sex {
        Sex::Male => dec!(40),
        Sex::Female => dec!(50),
    };
    if hdl >= dec!(60) {
        HdlLevel::HighProtective
    } else if hdl < low_cutoff {
        HdlLevel::Low
    } else {
        HdlLevel::Normal
    }
}

pub fn classify_triglycerides(tg: Decimal) -> TriglycerideLevel {
    if tg < dec!(150) {
        TriglycerideLevel::Normal
    } else if tg < dec!(200) {
        TriglycerideLevel::BorderlineHigh
    } else if tg < dec!(500) {
        TriglycerideLevel::High
    } else {
        TriglycerideLevel::VeryHigh
    }
}

pub fn classify_ratio(ratio: Decimal) -> RatioLevel {
    if ratio < dec!(3.5) {
        RatioLevel::Ideal
    } else if ratio < dec!(5) {
        RatioLevel::Good
    } else {
        RatioLevel::High
    }
}

/// Friedewald LDL estimate: TC − HDL − TG/5. `None` when TG ≥ 400 mg/dL.
pub fn estimate_ldl(total: Decimal, hdl: Decimal, triglycerides: Decimal) -> Option<Decimal> {
    if triglycerides >= FRIEDEWALD_TG_LIMIT {
        return None;
    }
    Some((total - hdl - triglycerides / dec!(5)).max(Decimal::ZERO))
}

impl CholesterolUnit {
    fn cholesterol_to_mg_dl(&self, value: Decimal) -> Decimal {
        match self {
            CholesterolUnit::MgPerDl => value,
            CholesterolUnit::MmolPerL => value * CHOLESTEROL_MMOL_FACTOR,
        }
    }

    fn triglycerides_to_mg_dl(&self, value: Decimal) -> Decimal {
        match self {
            CholesterolUnit::MgPerDl => value,
            CholesterolUnit::MmolPerL => value * TRIGLYCERIDE_MMOL_FACTOR,
        }
    }
}

// ---------------------------------------------------------------------------
// Risk score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactors {
    pub age: u32,
    pub sex: Sex,
    /// Total cholesterol, mg/dL
    pub total_cholesterol: Decimal,
    /// HDL cholesterol, mg/dL
    pub hdl: Decimal,
    #[serde(default)]
    pub smoker: bool,
    #[serde(default)]
    pub diabetic: bool,
    #[serde(default)]
    pub hypertensive: bool,
    #[serde(default)]
    pub family_history: bool,
}

/// One line of the score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPoint {
    pub factor: String,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScore {
    pub points: u32,
    pub tier: RiskTier,
    pub tier_label: String,
    pub ten_year_risk: String,
    pub breakdown: Vec<RiskPoint>,
}

fn age_points(age: u32) -> i32 {
    match age {
        0..=34 => 0,
        35..=44 => 1,
        45..=54 => 2,
        55..=64 => 3,
        _ => 4,
    }
}

/// Sum the weighted points for each factor and bucket the total.
pub fn risk_score(factors: &RiskFactors) -> RiskScore {
    let mut breakdown = vec![RiskPoint {
        factor: format!("Age {}", factors.age),
        points: age_points(factors.age),
    }];

    let total_points = match classify_total(factors.total_cholesterol) {
        TotalCholesterolLevel::Desirable => 0,
        TotalCholesterolLevel::BorderlineHigh => 1,
        TotalCholesterolLevel::High => 2,
    };
    breakdown.push(RiskPoint {
        factor: "Total cholesterol".into(),
        points: total_points,
    });

    let hdl_points = match classify_hdl(factors.hdl, factors.sex) {
        HdlLevel::Low => 2,
        HdlLevel::Normal => 0,
        HdlLevel::HighProtective => -1,
    };
    breakdown.push(RiskPoint {
        factor: "HDL cholesterol".into(),
        points: hdl_points,
    });

    let flags = [
        (factors.smoker, "Smoker", 2),
        (factors.diabetic, "Diabetes", 2),
        (factors.hypertensive, "Hypertension", 1),
        (factors.family_history, "Family history", 1),
    ];
    for (present, label, points) in flags {
        if present {
            breakdown.push(RiskPoint {
                factor: label.into(),
                points,
            });
        }
    }

    let sum: i32 = breakdown.iter().map(|p| p.points).sum();
    let points = sum.max(0) as u32;
    let tier = RiskTier::from_points(points);

    RiskScore {
        points,
        tier,
        tier_label: tier.to_string(),
        ten_year_risk: tier.ten_year_risk().to_string(),
        breakdown,
    }
}

// ---------------------------------------------------------------------------
// Full assessment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CholesterolPanel {
    #[serde(default)]
    pub unit: CholesterolUnit,
    pub total_cholesterol: Decimal,
    #[serde(default)]
    pub ldl: Option<Decimal>,
    pub hdl: Decimal,
    #[serde(default)]
    pub triglycerides: Option<Decimal>,
    pub age: u32,
    pub sex: Sex,
    #[serde(default)]
    pub smoker: bool,
    #[serde(default)]
    pub diabetic: bool,
    #[serde(default)]
    pub hypertensive: bool,
    #[serde(default)]
    pub family_history: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CholesterolAssessment {
    pub total_mg_dl: Decimal,
    pub total_level: String,
    pub ldl_mg_dl: Option<Decimal>,
    pub ldl_estimated: bool,
    pub ldl_level: Option<String>,
    pub hdl_mg_dl: Decimal,
    pub hdl_level: String,
    pub triglycerides_mg_dl: Option<Decimal>,
    pub triglyceride_level: Option<String>,
    pub total_hdl_ratio: Decimal,
    pub ratio_level: String,
    pub risk: RiskScore,
}

/// Classify every supplied lipid value and score overall risk.
pub fn assess_cholesterol(
    panel: &CholesterolPanel,
) -> CalcKitResult<ComputationOutput<CholesterolAssessment>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if panel.total_cholesterol <= Decimal::ZERO {
        return Err(CalcKitError::invalid(
            "total_cholesterol",
            "Total cholesterol must be positive",
        ));
    }
    if panel.hdl <= Decimal::ZERO {
        return Err(CalcKitError::invalid("hdl", "HDL must be positive"));
    }
    if panel.age == 0 {
        return Err(CalcKitError::invalid("age", "Age is required"));
    }
    if panel.ldl.is_some_and(|v| v < Decimal::ZERO)
        || panel.triglycerides.is_some_and(|v| v < Decimal::ZERO)
    {
        return Err(CalcKitError::invalid(
            "ldl",
            "LDL and triglycerides cannot be negative",
        ));
    }

    let total = panel.unit.cholesterol_to_mg_dl(panel.total_cholesterol);
    let hdl = panel.unit.cholesterol_to_mg_dl(panel.hdl);
    let tg = panel
        .triglycerides
        .map(|v| panel.unit.triglycerides_to_mg_dl(v));

    if hdl > total {
        warnings.push("HDL exceeds total cholesterol; check the entered values".into());
    }

    let (ldl, ldl_estimated) = match panel.ldl {
        Some(v) => (Some(panel.unit.cholesterol_to_mg_dl(v)), false),
        None => match tg {
            Some(t) => {
                let estimate = estimate_ldl(total, hdl, t);
                if estimate.is_none() {
                    warnings.push(
                        "Triglycerides of 400 mg/dL or more: LDL cannot be estimated".into(),
                    );
                }
                (estimate, estimate.is_some())
            }
            None => (None, false),
        },
    };

    let ratio = total / hdl;
    let risk = risk_score(&RiskFactors {
        age: panel.age,
        sex: panel.sex,
        total_cholesterol: total,
        hdl,
        smoker: panel.smoker,
        diabetic: panel.diabetic,
        hypertensive: panel.hypertensive,
        family_history: panel.family_history,
    });

    let output = CholesterolAssessment {
        total_mg_dl: total.round_dp(1),
        total_level: classify_total(total).to_string(),
        ldl_mg_dl: ldl.map(|v| v.round_dp(1)),
        ldl_estimated,
        ldl_level: ldl.map(|v| classify_ldl(v).to_string()),
        hdl_mg_dl: hdl.round_dp(1),
        hdl_level: classify_hdl(hdl, panel.sex).to_string(),
        triglycerides_mg_dl: tg.map(|v| v.round_dp(1)),
        triglyceride_level: tg.map(|v| classify_triglycerides(v).to_string()),
        total_hdl_ratio: ratio.round_dp(2),
        ratio_level: classify_ratio(ratio).to_string(),
        risk,
    };
    log::debug!("cholesterol risk tier {}", output.risk.tier_label);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Lipid panel classification with additive risk points",
        &serde_json::json!({
            "unit": panel.unit,
            "age": panel.age,
            "sex": panel.sex,
        }),
        warnings,
        elapsed,
        output,
    ))
}
