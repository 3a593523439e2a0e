//! Comparative analyses built on the amortization ledger.
//!
//! Both analyses run the loan twice: once as a plain level-payment loan
//! (the baseline) and once with the option applied, then report what the
//! option saves.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::schedule::{
    run_ledger, validate_options, ExtraPayment, LoanTerms, PaymentEvent, ScheduleOptions, StepUp,
};
use crate::time_value::compound;
use crate::types::*;
use crate::CalcKitResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentAnalysis {
    pub periodic_payment: Money,
    pub extra_payment: Money,
    pub baseline_interest: Money,
    pub prepaid_interest: Money,
    pub interest_saved: Money,
    pub baseline_periods: u32,
    pub prepaid_periods: u32,
    pub periods_reduced: u32,
    pub schedule: Vec<PaymentEvent>,
}

/// Payment in force at the start of a 12-period block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyPayment {
    pub year: u32,
    pub payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepUpAnalysis {
    pub initial_payment: Money,
    pub annual_increase_percent: Percent,
    pub baseline_interest: Money,
    pub step_up_interest: Money,
    pub interest_saved: Money,
    pub baseline_periods: u32,
    pub step_up_periods: u32,
    pub periods_reduced: u32,
    pub yearly_payments: Vec<YearlyPayment>,
    pub schedule: Vec<PaymentEvent>,
}

/// Compare a loan with and without a one-time extra principal payment.
pub fn analyze_prepayment(
    terms: &LoanTerms,
    extra: &ExtraPayment,
) -> CalcKitResult<ComputationOutput<PrepaymentAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let options = ScheduleOptions {
        extra_payment: Some(extra.clone()),
        ..Default::default()
    };
    terms.validate()?;
    validate_options(terms, &options, &mut warnings)?;

    let baseline = run_ledger(terms, &ScheduleOptions::default())?;
    let prepaid = run_ledger(terms, &options)?;

    if extra.amount.is_zero() {
        warnings.push("Extra payment is zero; schedule matches the baseline".into());
    }

    let baseline_interest = round_money(baseline.total_interest);
    let prepaid_interest = round_money(prepaid.total_interest);
    let output = PrepaymentAnalysis {
        periodic_payment: round_money(baseline.initial_payment),
        extra_payment: round_money(extra.amount),
        baseline_interest,
        prepaid_interest,
        interest_saved: baseline_interest - prepaid_interest,
        baseline_periods: baseline.periods,
        prepaid_periods: prepaid.periods,
        periods_reduced: baseline.periods.saturating_sub(prepaid.periods),
        schedule: prepaid.events,
    };
    log::debug!(
        "prepayment of {} saves {} interest",
        extra.amount,
        output.interest_saved
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Prepayment analysis (baseline vs. one-time extra principal)",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "term_months": terms.term_months,
            "extra_payment": extra,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Compare a level-payment loan against one whose payment rises every year.
pub fn analyze_step_up(
    terms: &LoanTerms,
    step_up: &StepUp,
) -> CalcKitResult<ComputationOutput<StepUpAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let options = ScheduleOptions {
        step_up: Some(step_up.clone()),
        ..Default::default()
    };
    terms.validate()?;
    validate_options(terms, &options, &mut warnings)?;

    let baseline = run_ledger(terms, &ScheduleOptions::default())?;
    let stepped = run_ledger(terms, &options)?;

    let growth = step_up.annual_increase_percent / dec!(100);
    let years = stepped.periods.div_ceil(12);
    let yearly_payments = (1..=years)
        .map(|year| {
            Ok(YearlyPayment {
                year,
                payment: round_money(compound(baseline.initial_payment, growth, year - 1)?),
            })
        })
        .collect::<CalcKitResult<Vec<_>>>()?;

    let baseline_interest = round_money(baseline.total_interest);
    let step_up_interest = round_money(stepped.total_interest);
    let output = StepUpAnalysis {
        initial_payment: round_money(baseline.initial_payment),
        annual_increase_percent: step_up.annual_increase_percent,
        baseline_interest,
        step_up_interest,
        interest_saved: baseline_interest - step_up_interest,
        baseline_periods: baseline.periods,
        step_up_periods: stepped.periods,
        periods_reduced: baseline.periods.saturating_sub(stepped.periods),
        yearly_payments,
        schedule: stepped.events,
    };

    if output.interest_saved < Decimal::ZERO {
        warnings.push("Step-up schedule costs more interest than the baseline".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Step-up payment analysis (baseline vs. annual escalation)",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "term_months": terms.term_months,
            "step_up": step_up,
        }),
        warnings,
        elapsed,
        output,
    ))
}
