#![cfg(feature = "health")]

use calc_kit_core::health::cholesterol::{
    assess_cholesterol, classify_hdl, classify_total, classify_triglycerides, risk_score,
    CholesterolPanel, CholesterolUnit, HdlLevel, RiskFactors, RiskTier, Sex,
    TotalCholesterolLevel, TriglycerideLevel,
};
use rust_decimal_macros::dec;

fn panel() -> CholesterolPanel {
    CholesterolPanel {
        unit: CholesterolUnit::MgPerDl,
        total_cholesterol: dec!(215),
        ldl: Some(dec!(135)),
        hdl: dec!(45),
        triglycerides: Some(dec!(160)),
        age: 52,
        sex: Sex::Female,
        smoker: false,
        diabetic: false,
        hypertensive: true,
        family_history: false,
    }
}

#[test]
fn test_total_200_is_borderline() {
    let level = classify_total(dec!(200));
    assert_eq!(level, TotalCholesterolLevel::BorderlineHigh);
    assert_eq!(level.to_string(), "Borderline High");
}

#[test]
fn test_hdl_60_protective_for_both_sexes() {
    assert_eq!(classify_hdl(dec!(60), Sex::Male), HdlLevel::HighProtective);
    assert_eq!(classify_hdl(dec!(60), Sex::Female), HdlLevel::HighProtective);
}

#[test]
fn test_classifiers_are_pure() {
    for value in [dec!(120), dec!(199.99), dec!(240), dec!(600)] {
        assert_eq!(classify_total(value), classify_total(value));
        assert_eq!(classify_triglycerides(value), classify_triglycerides(value));
    }
    assert_eq!(classify_triglycerides(dec!(500)), TriglycerideLevel::VeryHigh);
}

#[test]
fn test_full_assessment() {
    let out = assess_cholesterol(&panel()).unwrap();
    let a = &out.result;
    assert_eq!(a.total_level, "Borderline High");
    assert_eq!(a.ldl_level.as_deref(), Some("Borderline High"));
    assert_eq!(a.hdl_level, "Low");
    assert_eq!(a.triglyceride_level.as_deref(), Some("Borderline High"));
    assert!(!a.ldl_estimated);
    // 215 / 45
    assert_eq!(a.total_hdl_ratio, dec!(4.78));
    assert_eq!(a.ratio_level, "Good");
    // age 2 + total 1 + low HDL 2 + hypertension 1
    assert_eq!(a.risk.points, 6);
    assert_eq!(a.risk.tier, RiskTier::Moderate);
    assert_eq!(a.risk.ten_year_risk, "10-20%");
}

#[test]
fn test_assessment_is_repeatable() {
    let first = assess_cholesterol(&panel()).unwrap();
    let second = assess_cholesterol(&panel()).unwrap();
    assert_eq!(
        serde_json::to_value(&first.result).unwrap(),
        serde_json::to_value(&second.result).unwrap()
    );
}

#[test]
fn test_missing_ldl_without_triglycerides() {
    let mut p = panel();
    p.ldl = None;
    p.triglycerides = None;
    let out = assess_cholesterol(&p).unwrap();
    assert_eq!(out.result.ldl_mg_dl, None);
    assert_eq!(out.result.ldl_level, None);
}

#[test]
fn test_very_high_triglycerides_block_estimate() {
    let mut p = panel();
    p.ldl = None;
    p.triglycerides = Some(dec!(450));
    let out = assess_cholesterol(&p).unwrap();
    assert_eq!(out.result.ldl_mg_dl, None);
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_zero_total_is_validation_error() {
    let mut p = panel();
    p.total_cholesterol = dec!(0);
    assert!(assess_cholesterol(&p).unwrap_err().is_validation());
}

#[test]
fn test_risk_tiers_ladder() {
    let base = RiskFactors {
        age: 30,
        sex: Sex::Male,
        total_cholesterol: dec!(180),
        hdl: dec!(50),
        smoker: false,
        diabetic: false,
        hypertensive: false,
        family_history: false,
    };
    assert_eq!(risk_score(&base).tier, RiskTier::VeryLow);

    let smoker = RiskFactors {
        smoker: true,
        age: 45,
        ..base.clone()
    };
    // 2 + 2
    assert_eq!(risk_score(&smoker).points, 4);
    assert_eq!(risk_score(&smoker).tier, RiskTier::Low);

    let worse = RiskFactors {
        diabetic: true,
        family_history: true,
        ..smoker
    };
    // 4 + 2 + 1
    assert_eq!(risk_score(&worse).tier, RiskTier::High);
}
