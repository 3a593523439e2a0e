use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::CalcKitError;
use crate::types::{Money, Percent, Rate};
use crate::CalcKitResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);

/// Convert an annual percentage (8.5 = 8.5%) into the monthly periodic rate.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / HUNDRED / MONTHS_PER_YEAR
}

/// Level payment that fully amortises `principal` over `nper` periods.
///
/// Uses `P·r·(1+r)^n / ((1+r)^n − 1)`; a zero rate degenerates to `P / n`.
/// Returned as a positive amount (unlike the spreadsheet PMT sign convention).
pub fn annuity_payment(rate: Rate, nper: u32, principal: Money) -> CalcKitResult<Money> {
    if nper == 0 {
        return Err(CalcKitError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    if rate < Decimal::ZERO {
        return Err(CalcKitError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate cannot be negative".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = (Decimal::ONE + rate)
        .checked_powu(nper as u64)
        .ok_or_else(|| out_of_range("annuity growth factor"))?;
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(CalcKitError::DivisionByZero {
            context: "annuity payment factor".into(),
        });
    }

    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| out_of_range("annuity payment"))
}

/// Grow `amount` by `growth` per period, compounded over `periods`.
pub fn compound(amount: Money, growth: Rate, periods: u32) -> CalcKitResult<Money> {
    (Decimal::ONE + growth)
        .checked_powu(periods as u64)
        .and_then(|factor| amount.checked_mul(factor))
        .ok_or_else(|| out_of_range("compounded amount"))
}

/// Arithmetic left the representable decimal range: the rate or term is
/// too large for a meaningful result.
pub(crate) fn out_of_range(context: &str) -> CalcKitError {
    CalcKitError::FinancialImpossibility(format!(
        "{context} is too large to compute; reduce the rate or term"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
    }

    #[test]
    fn test_annuity_payment_basic() {
        // 100k at 8.5% over 20 years
        let pmt = annuity_payment(monthly_rate(dec!(8.5)), 240, dec!(100000)).unwrap();
        assert!((pmt - dec!(867.82)).abs() < dec!(0.01));
    }

    #[test]
    fn test_annuity_payment_zero_rate() {
        let pmt = annuity_payment(Decimal::ZERO, 12, dec!(12000)).unwrap();
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_annuity_payment_zero_periods() {
        assert!(annuity_payment(dec!(0.01), 0, dec!(1000)).is_err());
    }

    #[test]
    fn test_compound() {
        assert_eq!(compound(dec!(100), dec!(0.10), 2).unwrap(), dec!(121.00));
    }

    #[test]
    fn test_annuity_payment_overflow_is_an_error() {
        // 24% a year for 300 years: (1.02)^3600 exceeds the decimal range
        let err = annuity_payment(monthly_rate(dec!(24)), 3600, dec!(100000)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_compound_overflow_is_an_error() {
        assert!(compound(dec!(1000), dec!(10), 100).is_err());
    }
}
