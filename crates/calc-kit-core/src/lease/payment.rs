//! Closed-end vehicle lease payment arithmetic.
//!
//! The monthly payment is the sum of a depreciation fee (value consumed over
//! the term), a finance fee (money factor applied to the average of the net
//! capitalised cost and the residual) and sales tax on both. The result also
//! carries a comparison against financing the same capitalised cost with an
//! ordinary amortizing loan at the equivalent APR.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::schedule::{run_ledger, LoanTerms, ScheduleOptions, MAX_TERM_MONTHS};
use crate::error::CalcKitError;
use crate::types::*;
use crate::CalcKitResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Money factor × 2400 ≈ APR in percent.
const MONEY_FACTOR_TO_APR: Decimal = dec!(2400);
const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// How the lease's financing cost is quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseRate {
    /// Dealer money factor, e.g. 0.00125
    MoneyFactor(Decimal),
    /// Annual percentage rate, e.g. 3.0 for 3%
    Apr(Percent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseInput {
    /// Negotiated vehicle price (gross capitalised cost)
    pub vehicle_price: Money,
    #[serde(default)]
    pub down_payment: Money,
    #[serde(default)]
    pub trade_in_value: Money,
    /// Fees rolled into the capitalised cost (acquisition, documentation)
    #[serde(default)]
    pub capitalized_fees: Money,
    /// Residual as a percentage of the vehicle price
    pub residual_percent: Percent,
    pub term_months: u32,
    pub rate: LeaseRate,
    /// Sales tax applied to the monthly payment
    #[serde(default)]
    pub sales_tax_percent: Percent,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Financing the same capitalised cost with a loan over the same term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanComparison {
    pub loan_monthly_payment: Money,
    pub loan_total_interest: Money,
    /// Lease payment minus loan payment (negative when leasing is cheaper per month)
    pub monthly_difference: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseOutput {
    pub residual_value: Money,
    pub net_capitalized_cost: Money,
    pub money_factor: Decimal,
    pub equivalent_apr: Percent,
    pub depreciation_fee: Money,
    pub finance_fee: Money,
    pub base_monthly_payment: Money,
    pub monthly_tax: Money,
    pub total_monthly_payment: Money,
    pub total_finance_charges: Money,
    pub total_lease_cost: Money,
    pub loan_comparison: LoanComparison,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn money_factor_to_apr(money_factor: Decimal) -> Percent {
    money_factor * MONEY_FACTOR_TO_APR
}

pub fn apr_to_money_factor(apr: Percent) -> Decimal {
    apr / MONEY_FACTOR_TO_APR
}

impl LeaseRate {
    pub fn money_factor(&self) -> Decimal {
        match self {
            LeaseRate::MoneyFactor(mf) => *mf,
            LeaseRate::Apr(apr) => apr_to_money_factor(*apr),
        }
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

fn validate(input: &LeaseInput) -> CalcKitResult<()> {
    if input.vehicle_price <= Decimal::ZERO {
        return Err(CalcKitError::invalid(
            "vehicle_price",
            "Vehicle price must be positive",
        ));
    }
    if input.term_months == 0 {
        return Err(CalcKitError::invalid(
            "term_months",
            "Lease term must be at least 1 month",
        ));
    }
    if input.term_months > MAX_TERM_MONTHS {
        return Err(CalcKitError::invalid(
            "term_months",
            format!("Lease term cannot exceed {MAX_TERM_MONTHS} months"),
        ));
    }
    if input.down_payment < Decimal::ZERO
        || input.trade_in_value < Decimal::ZERO
        || input.capitalized_fees < Decimal::ZERO
    {
        return Err(CalcKitError::invalid(
            "down_payment",
            "Down payment, trade-in and fees cannot be negative",
        ));
    }
    if input.residual_percent < Decimal::ZERO || input.residual_percent > HUNDRED {
        return Err(CalcKitError::invalid(
            "residual_percent",
            "Residual must be between 0% and 100% of the price",
        ));
    }
    if input.rate.money_factor() < Decimal::ZERO {
        return Err(CalcKitError::invalid("rate", "Lease rate cannot be negative"));
    }
    if input.sales_tax_percent < Decimal::ZERO {
        return Err(CalcKitError::invalid(
            "sales_tax_percent",
            "Sales tax cannot be negative",
        ));
    }
    Ok(())
}

/// Calculate the monthly payment and total cost of a closed-end lease.
pub fn calculate_lease(input: &LeaseInput) -> CalcKitResult<ComputationOutput<LeaseOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;

    let term = Decimal::from(input.term_months);
    let money_factor = input.rate.money_factor();
    let apr = money_factor_to_apr(money_factor);
    let residual_value = input.vehicle_price * input.residual_percent / HUNDRED;

    let net_cap_cost = input.vehicle_price + input.capitalized_fees
        - input.down_payment
        - input.trade_in_value;
    if net_cap_cost <= Decimal::ZERO {
        return Err(CalcKitError::FinancialImpossibility(
            "Down payment and trade-in cover the whole capitalised cost".into(),
        ));
    }
    if net_cap_cost < residual_value {
        return Err(CalcKitError::FinancialImpossibility(format!(
            "Net capitalised cost {} is below the residual value {}",
            round_money(net_cap_cost),
            round_money(residual_value)
        )));
    }

    let depreciation_fee = (net_cap_cost - residual_value) / term;
    let finance_fee = (net_cap_cost + residual_value) * money_factor;
    let base_payment = depreciation_fee + finance_fee;
    let monthly_tax = base_payment * input.sales_tax_percent / HUNDRED;
    let total_monthly = base_payment + monthly_tax;

    if input.residual_percent > dec!(70) {
        warnings.push(format!(
            "Residual of {}% is unusually high; verify with the lessor",
            input.residual_percent
        ));
    }
    if apr > dec!(15) {
        warnings.push(format!("Equivalent APR of {}% is high", apr.round_dp(2)));
    }

    let loan = run_ledger(
        &LoanTerms::new(net_cap_cost, apr, input.term_months),
        &ScheduleOptions {
            display_limit: Some(0),
            ..Default::default()
        },
    )?;

    let output = LeaseOutput {
        residual_value: round_money(residual_value),
        net_capitalized_cost: round_money(net_cap_cost),
        money_factor,
        equivalent_apr: apr.round_dp(4),
        depreciation_fee: round_money(depreciation_fee),
        finance_fee: round_money(finance_fee),
        base_monthly_payment: round_money(base_payment),
        monthly_tax: round_money(monthly_tax),
        total_monthly_payment: round_money(total_monthly),
        total_finance_charges: round_money(finance_fee * term),
        total_lease_cost: round_money(total_monthly * term + input.down_payment),
        loan_comparison: LoanComparison {
            loan_monthly_payment: round_money(loan.initial_payment),
            loan_total_interest: round_money(loan.total_interest),
            monthly_difference: round_money(total_monthly - loan.initial_payment),
        },
    };
    log::debug!(
        "lease of {} over {} months: {}/month",
        input.vehicle_price,
        input.term_months,
        output.total_monthly_payment
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Closed-end lease (depreciation + money-factor finance fee)",
        &serde_json::json!({
            "vehicle_price": input.vehicle_price.to_string(),
            "residual_percent": input.residual_percent.to_string(),
            "term_months": input.term_months,
            "money_factor": money_factor.to_string(),
            "sales_tax_percent": input.sales_tax_percent.to_string(),
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

    fn sedan() -> LeaseInput {
        LeaseInput {
            vehicle_price: dec!(30000),
            down_payment: dec!(2000),
            trade_in_value: Decimal::ZERO,
            capitalized_fees: Decimal::ZERO,
            residual_percent: dec!(60),
            term_months: 36,
            rate: LeaseRate::MoneyFactor(dec!(0.00125)),
            sales_tax_percent: dec!(8),
        }
    }

    #[test]
    fn test_money_factor_conversion() {
        assert_eq!(money_factor_to_apr(dec!(0.00125)), dec!(3));
        assert_eq!(apr_to_money_factor(dec!(6)), dec!(0.0025));
    }

    #[test]
    fn test_lease_payment_components() {
        let out = calculate_lease(&sedan()).unwrap();
        let r = &out.result;
        // residual = 18000, net cap = 28000
        assert_eq!(r.residual_value, dec!(18000));
        assert_eq!(r.net_capitalized_cost, dec!(28000));
        // (28000 - 18000) / 36 = 277.78
        assert_eq!(r.depreciation_fee, dec!(277.78));
        // (28000 + 18000) * 0.00125 = 57.50
        assert_eq!(r.finance_fee, dec!(57.50));
        assert_eq!(r.base_monthly_payment, dec!(335.28));
        assert_eq!(r.monthly_tax, dec!(26.82));
        assert_eq!(r.total_monthly_payment, dec!(362.10));
        assert_eq!(r.equivalent_apr, dec!(3));
    }

    #[test]
    fn test_apr_quote_matches_money_factor_quote() {
        let mut input = sedan();
        input.rate = LeaseRate::Apr(dec!(3));
        let by_apr = calculate_lease(&input).unwrap();
        let by_mf = calculate_lease(&sedan()).unwrap();
        assert_eq!(
            by_apr.result.total_monthly_payment,
            by_mf.result.total_monthly_payment
        );
    }

    #[test]
    fn test_loan_comparison_costs_more_per_month() {
        let out = calculate_lease(&sedan()).unwrap();
        let cmp = &out.result.loan_comparison;
        // Loan repays the full 28000, lease only the depreciation
        assert!(cmp.loan_monthly_payment > out.result.base_monthly_payment);
        assert!(cmp.monthly_difference < Decimal::ZERO);
    }

    #[test]
    fn test_down_payment_exceeding_price() {
        let mut input = sedan();
        input.down_payment = dec!(31000);
        let err = calculate_lease(&input).unwrap_err();
        assert!(matches!(err, CalcKitError::FinancialImpossibility(_)));
    }

    #[test]
    fn test_residual_above_net_cap() {
        let mut input = sedan();
        input.down_payment = dec!(15000);
        assert!(calculate_lease(&input).is_err());
    }

    #[test]
    fn test_zero_term_rejected() {
        let mut input = sedan();
        input.term_months = 0;
        assert!(calculate_lease(&input).unwrap_err().is_validation());
    }

    #[test]
    fn test_term_beyond_limit_rejected() {
        let mut input = sedan();
        input.term_months = u32::MAX;
        assert!(calculate_lease(&input).unwrap_err().is_validation());
    }
}
