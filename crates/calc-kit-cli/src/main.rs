mod commands;
mod input;
mod output;

use calc_kit_core::{CalcKitError, Currency};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::documents::{MarginArgs, MergeArgs};
use commands::health::CholesterolArgs;
use commands::lease::LeaseArgs;
use commands::loan::{EmiArgs, PrepaymentArgs, StepUpArgs};
use commands::text::ParagraphArgs;

/// Everyday calculators and document tools
#[derive(Parser)]
#[command(
    name = "calckit",
    version,
    about = "Everyday calculators and document tools",
    long_about = "A CLI for loan amortization, prepayment and step-up planning, car lease \
                  payments, cholesterol risk assessment, paragraph statistics, and PDF \
                  merging and margin adjustment. Money is computed with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Currency code used for formatted amounts (USD, GBP, EUR, INR, ...)
    #[arg(long, default_value = "USD", global = true)]
    currency: String,

    /// Log calculation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly instalment and amortization schedule
    Emi(EmiArgs),
    /// Interest and time saved by a one-time extra payment
    Prepayment(PrepaymentArgs),
    /// Payoff plan with a yearly payment increase
    StepUp(StepUpArgs),
    /// Car lease monthly payment and loan comparison
    Lease(LeaseArgs),
    /// Classify a lipid panel and estimate cardiovascular risk
    Cholesterol(CholesterolArgs),
    /// Paragraph, word and sentence statistics
    Paragraphs(ParagraphArgs),
    /// Merge PDF files in the given order
    PdfMerge(MergeArgs),
    /// Add or remove page margins on a PDF
    PdfMargins(MarginArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let currency = Currency::from_code(&cli.currency);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Emi(args) => commands::loan::run_emi(args, &currency),
        Commands::Prepayment(args) => commands::loan::run_prepayment(args, &currency),
        Commands::StepUp(args) => commands::loan::run_step_up(args, &currency),
        Commands::Lease(args) => commands::lease::run_lease(args, &currency),
        Commands::Cholesterol(args) => commands::health::run_cholesterol(args),
        Commands::Paragraphs(args) => commands::text::run_paragraphs(args),
        Commands::PdfMerge(args) => commands::documents::run_merge(args),
        Commands::PdfMargins(args) => commands::documents::run_margins(args),
        Commands::Version => {
            println!("calckit {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => match e.downcast_ref::<CalcKitError>() {
            // Inputs that are incomplete or out of range are not failures.
            Some(calc_err) if calc_err.is_validation() => {
                log::info!("{calc_err}");
                let mut value = output::placeholder("Enter valid values to see results");
                value["reason"] = calc_err.to_string().into();
                output::format_output(&cli.output, &value);
                process::exit(0);
            }
            _ => {
                eprintln!("{}: {}", "error".red().bold(), e);
                process::exit(1);
            }
        },
    }
}
