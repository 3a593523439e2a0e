use clap::Args;
use rust_decimal::Decimal;

use calc_kit_core::lease::payment::{self, LeaseInput, LeaseRate};
use calc_kit_core::Currency;

use super::{attach_formatted, CommandResult};
use crate::input;
use crate::output::placeholder;

/// Arguments for the car lease calculator
#[derive(Args)]
pub struct LeaseArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Negotiated vehicle price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Cash down payment
    #[arg(long, default_value = "0")]
    pub down: Decimal,

    /// Trade-in value
    #[arg(long, default_value = "0")]
    pub trade_in: Decimal,

    /// Fees rolled into the capitalised cost
    #[arg(long, default_value = "0")]
    pub fees: Decimal,

    /// Residual value as a percentage of the price
    #[arg(long)]
    pub residual: Option<Decimal>,

    /// Lease term in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Dealer money factor (e.g. 0.00125)
    #[arg(long, conflicts_with = "apr")]
    pub money_factor: Option<Decimal>,

    /// Annual percentage rate (e.g. 3.0)
    #[arg(long)]
    pub apr: Option<Decimal>,

    /// Sales tax on the monthly payment, in percent
    #[arg(long, default_value = "0")]
    pub tax: Decimal,
}

impl LeaseArgs {
    fn to_input(&self) -> Option<LeaseInput> {
        let rate = match (self.money_factor, self.apr) {
            (Some(mf), _) => LeaseRate::MoneyFactor(mf),
            (None, Some(apr)) => LeaseRate::Apr(apr),
            (None, None) => return None,
        };
        Some(LeaseInput {
            vehicle_price: self.price?,
            down_payment: self.down,
            trade_in_value: self.trade_in,
            capitalized_fees: self.fees,
            residual_percent: self.residual?,
            term_months: self.months?,
            rate,
            sales_tax_percent: self.tax,
        })
    }
}

pub fn run_lease(args: LeaseArgs, currency: &Currency) -> CommandResult {
    let lease_input: LeaseInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        match args.to_input() {
            Some(lease_input) => lease_input,
            None => {
                return Ok(placeholder(
                    "Enter vehicle price, residual, term and a money factor or APR",
                ))
            }
        }
    };

    let result = payment::calculate_lease(&lease_input)?;
    let mut value = serde_json::to_value(result)?;
    attach_formatted(
        &mut value,
        currency,
        &[
            "net_capitalized_cost",
            "residual_value",
            "base_monthly_payment",
            "total_monthly_payment",
            "total_lease_cost",
        ],
    );
    Ok(value)
}
