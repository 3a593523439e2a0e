use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;

use calc_kit_core::amortization::analysis;
use calc_kit_core::amortization::schedule::{
    self, ExtraPayment, LoanForm, LoanTerms, ScheduleOptions, StepUp,
};
use calc_kit_core::Currency;

use super::{attach_formatted, CommandResult};
use crate::input;
use crate::output::placeholder;

const LOAN_PLACEHOLDER: &str = "Enter loan amount, interest rate and tenure to see results";

/// Loan inputs shared by the EMI, prepayment and step-up commands
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 8.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Tenure in years (used when --months is absent)
    #[arg(long)]
    pub years: Option<u32>,
}

impl LoanArgs {
    fn form(&self) -> LoanForm {
        LoanForm {
            principal: self.principal,
            annual_rate_percent: self.rate,
            term_months: self.months,
            term_years: self.years,
        }
    }
}

/// Read a request from --input, piped stdin, or fall back to the flags.
fn read_request<T, F>(args: &LoanArgs, from_flags: F) -> Result<T, Box<dyn std::error::Error>>
where
    T: serde::de::DeserializeOwned,
    F: FnOnce() -> Result<T, Box<dyn std::error::Error>>,
{
    if let Some(ref path) = args.input {
        input::file::read_input(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        from_flags()
    }
}

const MONEY_FIELDS: [&str; 9] = [
    "periodic_payment",
    "initial_payment",
    "total_principal",
    "total_interest",
    "total_paid",
    "interest_saved",
    "baseline_interest",
    "prepaid_interest",
    "step_up_interest",
];

// ---------------------------------------------------------------------------
// EMI
// ---------------------------------------------------------------------------

/// Arguments for the EMI / amortization schedule
#[derive(Args)]
pub struct EmiArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// One-time extra principal payment
    #[arg(long)]
    pub extra_amount: Option<Decimal>,

    /// Period in which the extra payment is made (1-based)
    #[arg(long)]
    pub extra_period: Option<u32>,

    /// Annual payment increase in percent
    #[arg(long)]
    pub step_up: Option<Decimal>,

    /// Number of schedule rows to show (default 60)
    #[arg(long)]
    pub rows: Option<usize>,
}

#[derive(Deserialize)]
struct EmiRequest {
    #[serde(flatten)]
    form: LoanForm,
    #[serde(flatten)]
    options: ScheduleOptions,
}

fn extra_from_flags(
    amount: Option<Decimal>,
    period: Option<u32>,
) -> Result<Option<ExtraPayment>, Box<dyn std::error::Error>> {
    match (amount, period) {
        (Some(amount), Some(after_period)) => Ok(Some(ExtraPayment {
            amount,
            after_period,
        })),
        (Some(_), None) => Err("--extra-period is required with --extra-amount".into()),
        (None, Some(_)) => Err("--extra-amount is required with --extra-period".into()),
        (None, None) => Ok(None),
    }
}

pub fn run_emi(args: EmiArgs, currency: &Currency) -> CommandResult {
    let request: EmiRequest = read_request(&args.loan, || {
        Ok(EmiRequest {
            form: args.loan.form(),
            options: ScheduleOptions {
                extra_payment: extra_from_flags(args.extra_amount, args.extra_period)?,
                step_up: args.step_up.map(|annual_increase_percent| StepUp {
                    annual_increase_percent,
                }),
                display_limit: args.rows,
            },
        })
    })?;

    let Some(terms) = LoanTerms::from_form(&request.form) else {
        return Ok(placeholder(LOAN_PLACEHOLDER));
    };
    let result = schedule::compute_schedule(&terms, &request.options)?;
    let mut value = serde_json::to_value(result)?;
    attach_formatted(&mut value, currency, &MONEY_FIELDS);
    Ok(value)
}

// ---------------------------------------------------------------------------
// Prepayment
// ---------------------------------------------------------------------------

/// Arguments for prepayment analysis
#[derive(Args)]
pub struct PrepaymentArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// One-time extra principal payment
    #[arg(long)]
    pub extra_amount: Option<Decimal>,

    /// Period in which the extra payment is made (1-based)
    #[arg(long)]
    pub extra_period: Option<u32>,
}

#[derive(Deserialize)]
struct PrepaymentRequest {
    #[serde(flatten)]
    form: LoanForm,
    #[serde(default)]
    extra_payment: Option<ExtraPayment>,
}

pub fn run_prepayment(args: PrepaymentArgs, currency: &Currency) -> CommandResult {
    let request: PrepaymentRequest = read_request(&args.loan, || {
        Ok(PrepaymentRequest {
            form: args.loan.form(),
            extra_payment: extra_from_flags(args.extra_amount, args.extra_period)?,
        })
    })?;

    let (Some(terms), Some(extra)) = (LoanTerms::from_form(&request.form), request.extra_payment)
    else {
        return Ok(placeholder(
            "Enter the loan and an extra payment amount and period to see savings",
        ));
    };
    let result = analysis::analyze_prepayment(&terms, &extra)?;
    let mut value = serde_json::to_value(result)?;
    attach_formatted(&mut value, currency, &MONEY_FIELDS);
    Ok(value)
}

// ---------------------------------------------------------------------------
// Step-up
// ---------------------------------------------------------------------------

/// Arguments for step-up payment analysis
#[derive(Args)]
pub struct StepUpArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Annual payment increase in percent (e.g. 5)
    #[arg(long)]
    pub increase: Option<Decimal>,
}

#[derive(Deserialize)]
struct StepUpRequest {
    #[serde(flatten)]
    form: LoanForm,
    #[serde(default)]
    step_up: Option<StepUp>,
}

pub fn run_step_up(args: StepUpArgs, currency: &Currency) -> CommandResult {
    let request: StepUpRequest = read_request(&args.loan, || {
        Ok(StepUpRequest {
            form: args.loan.form(),
            step_up: args.increase.map(|annual_increase_percent| StepUp {
                annual_increase_percent,
            }),
        })
    })?;

    let (Some(terms), Some(step_up)) = (LoanTerms::from_form(&request.form), request.step_up)
    else {
        return Ok(placeholder(
            "Enter the loan and an annual increase to see the step-up plan",
        ));
    };
    let result = analysis::analyze_step_up(&terms, &step_up)?;
    let mut value = serde_json::to_value(result)?;
    attach_formatted(&mut value, currency, &MONEY_FIELDS);
    Ok(value)
}
