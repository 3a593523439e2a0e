use clap::{Args, ValueEnum};
use rust_decimal::Decimal;

use calc_kit_core::health::cholesterol::{self, CholesterolPanel, CholesterolUnit, Sex};

use super::CommandResult;
use crate::input;
use crate::output::placeholder;

#[derive(Clone, Copy, ValueEnum)]
pub enum SexArg {
    Male,
    Female,
}

impl From<SexArg> for Sex {
    fn from(arg: SexArg) -> Self {
        match arg {
            SexArg::Male => Sex::Male,
            SexArg::Female => Sex::Female,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum UnitArg {
    #[default]
    MgDl,
    MmolL,
}

impl From<UnitArg> for CholesterolUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::MgDl => CholesterolUnit::MgPerDl,
            UnitArg::MmolL => CholesterolUnit::MmolPerL,
        }
    }
}

/// Arguments for the cholesterol assessment
#[derive(Args)]
pub struct CholesterolArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Total cholesterol
    #[arg(long)]
    pub total: Option<Decimal>,

    /// LDL cholesterol (estimated from total, HDL and triglycerides when absent)
    #[arg(long)]
    pub ldl: Option<Decimal>,

    /// HDL cholesterol
    #[arg(long)]
    pub hdl: Option<Decimal>,

    /// Triglycerides
    #[arg(long)]
    pub triglycerides: Option<Decimal>,

    /// Unit of the lipid values
    #[arg(long, value_enum, default_value_t = UnitArg::MgDl)]
    pub unit: UnitArg,

    #[arg(long)]
    pub age: Option<u32>,

    #[arg(long, value_enum)]
    pub sex: Option<SexArg>,

    #[arg(long)]
    pub smoker: bool,

    #[arg(long)]
    pub diabetic: bool,

    #[arg(long)]
    pub hypertensive: bool,

    /// Premature heart disease in a first-degree relative
    #[arg(long)]
    pub family_history: bool,
}

impl CholesterolArgs {
    fn to_panel(&self) -> Option<CholesterolPanel> {
        Some(CholesterolPanel {
            unit: self.unit.into(),
            total_cholesterol: self.total?,
            ldl: self.ldl,
            hdl: self.hdl?,
            triglycerides: self.triglycerides,
            age: self.age?,
            sex: self.sex?.into(),
            smoker: self.smoker,
            diabetic: self.diabetic,
            hypertensive: self.hypertensive,
            family_history: self.family_history,
        })
    }
}

pub fn run_cholesterol(args: CholesterolArgs) -> CommandResult {
    let panel: CholesterolPanel = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        match args.to_panel() {
            Some(panel) => panel,
            None => {
                return Ok(placeholder(
                    "Enter total cholesterol, HDL, age and sex to see your assessment",
                ))
            }
        }
    };

    let result = cholesterol::assess_cholesterol(&panel)?;
    Ok(serde_json::to_value(result)?)
}
