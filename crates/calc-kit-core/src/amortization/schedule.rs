use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcKitError;
use crate::time_value::{annuity_payment, monthly_rate, out_of_range};
use crate::types::*;
use crate::CalcKitResult;

/// Rows kept in the displayed schedule unless the caller asks otherwise.
pub const DEFAULT_DISPLAY_PERIODS: usize = 60;

/// Balances below one cent are treated as settled.
const SETTLEMENT_EPSILON: Decimal = dec!(0.01);

const PERIODS_PER_YEAR: u32 = 12;

/// Longest accepted term: 100 years of monthly payments.
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Core loan inputs: amount, annual rate as a percentage, term in months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate_percent: Percent,
    pub term_months: u32,
}

/// Raw, possibly incomplete form values as typed by a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanForm {
    #[serde(default)]
    pub principal: Option<Money>,
    #[serde(default)]
    pub annual_rate_percent: Option<Percent>,
    #[serde(default)]
    pub term_months: Option<u32>,
    /// Alternative to `term_months`; ignored when months are given.
    #[serde(default)]
    pub term_years: Option<u32>,
}

/// One-time additional principal payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPayment {
    pub amount: Money,
    /// Period (1-based) in which the extra amount is paid.
    pub after_period: u32,
}

/// Annual payment escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepUp {
    pub annual_increase_percent: Percent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_payment: Option<ExtraPayment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_up: Option<StepUp>,
    /// Maximum number of schedule rows returned (defaults to 60).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_limit: Option<usize>,
}

/// A single row of the amortization ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub period: u32,
    pub scheduled_payment: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    pub extra_principal: Money,
    pub ending_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationResult {
    /// Payment in the first period (before any step-up).
    pub periodic_payment: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    pub periods_to_payoff: u32,
    pub schedule: Vec<PaymentEvent>,
    /// True when the ledger ran longer than the displayed rows.
    pub schedule_truncated: bool,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate_percent: Percent, term_months: u32) -> Self {
        LoanTerms {
            principal,
            annual_rate_percent,
            term_months,
        }
    }

    /// Build terms from form values. Missing or non-positive required fields
    /// yield `None` ("enter values to see results").
    pub fn from_form(form: &LoanForm) -> Option<Self> {
        let principal = form.principal.filter(|p| *p > Decimal::ZERO)?;
        let rate = form.annual_rate_percent.filter(|r| *r >= Decimal::ZERO)?;
        let term = form
            .term_months
            .or_else(|| form.term_years.and_then(|y| y.checked_mul(PERIODS_PER_YEAR)))
            .filter(|t| *t > 0)?;
        Some(LoanTerms::new(principal, rate, term))
    }

    pub fn validate(&self) -> CalcKitResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(CalcKitError::invalid("principal", "Loan amount must be positive"));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(CalcKitError::invalid(
                "annual_rate_percent",
                "Interest rate cannot be negative",
            ));
        }
        if self.term_months == 0 {
            return Err(CalcKitError::invalid(
                "term_months",
                "Term must be at least 1 month",
            ));
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(CalcKitError::invalid(
                "term_months",
                format!("Term cannot exceed {MAX_TERM_MONTHS} months"),
            ));
        }
        Ok(())
    }
}

/// Raw, unrounded result of walking the loan period by period.
#[derive(Debug, Clone)]
pub(crate) struct Ledger {
    pub initial_payment: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    pub periods: u32,
    pub events: Vec<PaymentEvent>,
}

pub(crate) fn validate_options(
    terms: &LoanTerms,
    options: &ScheduleOptions,
    warnings: &mut Vec<String>,
) -> CalcKitResult<()> {
    if let Some(extra) = &options.extra_payment {
        if extra.amount < Decimal::ZERO {
            return Err(CalcKitError::invalid(
                "extra_payment.amount",
                "Extra payment cannot be negative",
            ));
        }
        if extra.after_period == 0 {
            return Err(CalcKitError::invalid(
                "extra_payment.after_period",
                "Extra payment period is 1-based",
            ));
        }
        if extra.after_period > terms.term_months {
            warnings.push(format!(
                "Extra payment in period {} falls after the {}-month term and is ignored",
                extra.after_period, terms.term_months
            ));
        }
    }
    if let Some(step) = &options.step_up {
        if step.annual_increase_percent < Decimal::ZERO {
            return Err(CalcKitError::invalid(
                "step_up.annual_increase_percent",
                "Annual increase cannot be negative",
            ));
        }
        if terms.term_months <= PERIODS_PER_YEAR {
            warnings.push("Step-up has no effect on a term of one year or less".into());
        }
    }
    Ok(())
}

/// Walk the loan from the first period until it is repaid or the term ends.
pub(crate) fn run_ledger(terms: &LoanTerms, options: &ScheduleOptions) -> CalcKitResult<Ledger> {
    let r = monthly_rate(terms.annual_rate_percent);
    let initial_payment = annuity_payment(r, terms.term_months, terms.principal)?;
    let display_limit = options.display_limit.unwrap_or(DEFAULT_DISPLAY_PERIODS);

    let mut payment = initial_payment;
    let mut balance = terms.principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut periods = 0u32;
    let mut events = Vec::with_capacity(display_limit.min(terms.term_months as usize));

    for period in 1..=terms.term_months {
        if balance <= Decimal::ZERO {
            break;
        }

        if let Some(step) = &options.step_up {
            if period > PERIODS_PER_YEAR && (period - 1) % PERIODS_PER_YEAR == 0 {
                payment = payment
                    .checked_mul(Decimal::ONE + step.annual_increase_percent / dec!(100))
                    .ok_or_else(|| out_of_range("stepped-up payment"))?;
            }
        }

        let interest = balance * r;
        let mut principal = if period == terms.term_months {
            // Settle whatever rounding left behind.
            balance
        } else {
            (payment - interest).min(balance)
        };

        let extra = match &options.extra_payment {
            Some(e) if e.after_period == period => e.amount.min(balance - principal),
            _ => Decimal::ZERO,
        };

        balance -= principal + extra;
        if balance < SETTLEMENT_EPSILON {
            principal += balance;
            balance = Decimal::ZERO;
        }

        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| out_of_range("total interest"))?;
        total_principal += principal + extra;
        periods = period;

        if events.len() < display_limit {
            events.push(PaymentEvent {
                period,
                scheduled_payment: round_money(interest + principal),
                interest_portion: round_money(interest),
                principal_portion: round_money(principal),
                extra_principal: round_money(extra),
                ending_balance: round_money(balance),
            });
        }
    }

    Ok(Ledger {
        initial_payment,
        total_interest,
        total_principal,
        periods,
        events,
    })
}

/// Compute the periodic payment and amortization schedule for a loan.
pub fn compute_schedule(
    terms: &LoanTerms,
    options: &ScheduleOptions,
) -> CalcKitResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    terms.validate()?;
    validate_options(terms, options, &mut warnings)?;

    if terms.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate: payment is principal divided by term".into());
    }

    let ledger = run_ledger(terms, options)?;
    log::debug!(
        "amortized {} over {} periods (paid off in {})",
        terms.principal,
        terms.term_months,
        ledger.periods
    );

    let total_principal = round_money(ledger.total_principal);
    let total_interest = round_money(ledger.total_interest);
    let output = AmortizationResult {
        periodic_payment: round_money(ledger.initial_payment),
        total_principal,
        total_interest,
        total_paid: total_principal + total_interest,
        periods_to_payoff: ledger.periods,
        schedule_truncated: (ledger.events.len() as u32) < ledger.periods,
        schedule: ledger.events,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization (annuity formula)",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "term_months": terms.term_months,
            "options": options,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn home_loan() -> LoanTerms {
        LoanTerms::new(dec!(100000), dec!(8.5), 240)
    }

    #[test]
    fn test_standard_emi() {
        let out = compute_schedule(&home_loan(), &ScheduleOptions::default()).unwrap();
        let r = &out.result;
        assert_eq!(r.periodic_payment, dec!(867.82));
        assert_eq!(r.periods_to_payoff, 240);
        assert_eq!(r.total_principal, dec!(100000));
        assert_eq!(r.schedule.len(), DEFAULT_DISPLAY_PERIODS);
        assert!(r.schedule_truncated);
    }

    #[test]
    fn test_first_period_split() {
        let out = compute_schedule(&home_loan(), &ScheduleOptions::default()).unwrap();
        let first = &out.result.schedule[0];
        // 100000 * 0.085 / 12 = 708.33
        assert_eq!(first.interest_portion, dec!(708.33));
        assert_eq!(first.principal_portion, dec!(159.49));
        assert_eq!(first.ending_balance, dec!(99840.51));
    }

    #[test]
    fn test_zero_rate_is_straight_division() {
        let terms = LoanTerms::new(dec!(12000), Decimal::ZERO, 12);
        let out = compute_schedule(&terms, &ScheduleOptions::default()).unwrap();
        assert_eq!(out.result.periodic_payment, dec!(1000));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
        assert_eq!(out.result.schedule.last().unwrap().ending_balance, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_single_month_term() {
        let terms = LoanTerms::new(dec!(1000), dec!(12), 1);
        let out = compute_schedule(&terms, &ScheduleOptions::default()).unwrap();
        assert_eq!(out.result.periodic_payment, dec!(1010));
        assert_eq!(out.result.total_interest, dec!(10));
        assert_eq!(out.result.schedule.len(), 1);
    }

    #[test]
    fn test_extra_payment_larger_than_balance_is_capped() {
        let terms = LoanTerms::new(dec!(5000), dec!(6), 12);
        let opts = ScheduleOptions {
            extra_payment: Some(ExtraPayment {
                amount: dec!(1000000),
                after_period: 2,
            }),
            ..Default::default()
        };
        let out = compute_schedule(&terms, &opts).unwrap();
        let r = &out.result;
        assert_eq!(r.periods_to_payoff, 2);
        assert_eq!(r.schedule[1].ending_balance, Decimal::ZERO);
        assert_eq!(r.total_principal, dec!(5000));
    }

    #[test]
    fn test_extra_payment_after_term_warns() {
        let terms = LoanTerms::new(dec!(5000), dec!(6), 12);
        let opts = ScheduleOptions {
            extra_payment: Some(ExtraPayment {
                amount: dec!(100),
                after_period: 24,
            }),
            ..Default::default()
        };
        let out = compute_schedule(&terms, &opts).unwrap();
        assert_eq!(out.result.periods_to_payoff, 12);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_step_up_increases_payment_in_second_year() {
        let terms = LoanTerms::new(dec!(50000), dec!(10), 60);
        let opts = ScheduleOptions {
            step_up: Some(StepUp {
                annual_increase_percent: dec!(10),
            }),
            ..Default::default()
        };
        let out = compute_schedule(&terms, &opts).unwrap();
        let s = &out.result.schedule;
        assert_eq!(s[11].scheduled_payment, s[0].scheduled_payment);
        assert!(s[12].scheduled_payment > s[11].scheduled_payment);
        assert!(out.result.periods_to_payoff < 60);
    }

    #[test]
    fn test_display_limit_override() {
        let opts = ScheduleOptions {
            display_limit: Some(12),
            ..Default::default()
        };
        let out = compute_schedule(&home_loan(), &opts).unwrap();
        assert_eq!(out.result.schedule.len(), 12);
    }

    #[test]
    fn test_invalid_principal() {
        let terms = LoanTerms::new(Decimal::ZERO, dec!(5), 12);
        let err = compute_schedule(&terms, &ScheduleOptions::default()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_zero_term_rejected() {
        let terms = LoanTerms::new(dec!(1000), dec!(5), 0);
        assert!(compute_schedule(&terms, &ScheduleOptions::default()).is_err());
    }

    #[test]
    fn test_from_form_missing_fields() {
        let form = LoanForm {
            principal: Some(dec!(1000)),
            annual_rate_percent: None,
            term_months: Some(12),
            term_years: None,
        };
        assert!(LoanTerms::from_form(&form).is_none());
    }

    #[test]
    fn test_from_form_huge_years_is_no_result() {
        let form = LoanForm {
            principal: Some(dec!(1000)),
            annual_rate_percent: Some(dec!(7)),
            term_months: None,
            term_years: Some(u32::MAX / 2),
        };
        assert!(LoanTerms::from_form(&form).is_none());
    }

    #[test]
    fn test_long_high_rate_loan_is_rejected_not_panicking() {
        let terms = LoanTerms::new(dec!(100000), dec!(24), 3600);
        let err = compute_schedule(&terms, &ScheduleOptions::default()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_rate_too_high_for_decimal_range() {
        // (1 + 100%/12)^900 does not fit in a Decimal
        let terms = LoanTerms::new(dec!(100000), dec!(100), 900);
        let err = compute_schedule(&terms, &ScheduleOptions::default()).unwrap_err();
        assert!(matches!(err, CalcKitError::FinancialImpossibility(_)));
    }

    #[test]
    fn test_huge_zero_rate_term_is_bounded() {
        let terms = LoanTerms::new(dec!(100000), Decimal::ZERO, u32::MAX - 1);
        let err = compute_schedule(&terms, &ScheduleOptions::default()).unwrap_err();
        assert!(matches!(err, CalcKitError::InvalidInput { .. }));

        let longest = LoanTerms::new(dec!(120000), Decimal::ZERO, MAX_TERM_MONTHS);
        let out = compute_schedule(&longest, &ScheduleOptions::default()).unwrap();
        assert_eq!(out.result.periodic_payment, dec!(100));
        assert_eq!(out.result.periods_to_payoff, MAX_TERM_MONTHS);
    }

    #[test]
    fn test_from_form_years() {
        let form = LoanForm {
            principal: Some(dec!(1000)),
            annual_rate_percent: Some(dec!(7)),
            term_months: None,
            term_years: Some(3),
        };
        let terms = LoanTerms::from_form(&form).unwrap();
        assert_eq!(terms.term_months, 36);
    }
}
