use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::api::{AppState, run_http_server};
use crate::core::{
    AdjustDirection, AssetAllocation, CalcError, CarFinanceParameters, CompoundParameters,
    CompoundingFrequency, ContributionFrequency, InflationParameters, InflationSeries,
    MortgageParameters, ProjectionParameters, StudentLoanPlan, TakeHomeParameters, UkTaxBands,
    adjust_for_inflation, calculate_car_finance, calculate_mortgage, calculate_take_home,
    project_compound, project_growth,
};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Calc(#[from] CalcError),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP server error: {0}")]
    Server(#[source] std::io::Error),
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "fincalc",
    version,
    about = "Personal finance calculators: mortgage, car finance, pension, compound interest, inflation, take-home pay"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the calculators over HTTP
    Serve(ServeArgs),
    /// Monthly repayment, overpayment savings and rate sensitivity
    Mortgage(MortgageArgs),
    /// Hire purchase or PCP with an optional balloon
    CarFinance(CarFinanceArgs),
    /// Multi-asset pension growth projection
    Pension(PensionArgs),
    /// Compound interest with regular contributions
    Compound(CompoundArgs),
    /// Adjust an amount by historical inflation
    Inflation(InflationArgs),
    /// UK take-home pay after tax, NI, pension and student loans
    TakeHome(TakeHomeArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "FINCALC_PORT", default_value_t = 8080)]
    pub port: u16,
    #[arg(
        long,
        env = "FINCALC_INFLATION_TABLE",
        help = "JSON inflation table replacing the bundled UK CPI series"
    )]
    pub inflation_table: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MortgageArgs {
    #[arg(long, default_value_t = 250_000.0)]
    pub property_price: f64,
    #[arg(long, default_value_t = 25_000.0)]
    pub deposit: f64,
    #[arg(long, default_value_t = 4.5, help = "Annual interest rate (%)")]
    pub rate: f64,
    #[arg(long, default_value_t = 25)]
    pub term_years: u32,
    #[arg(long, default_value_t = 0.0)]
    pub overpayment: f64,
    #[arg(long, help = "Include the year-by-year schedule")]
    pub schedule: bool,
}

impl From<MortgageArgs> for MortgageParameters {
    fn from(args: MortgageArgs) -> Self {
        Self {
            property_price: args.property_price,
            deposit: args.deposit,
            annual_rate_pct: args.rate,
            term_years: args.term_years,
            monthly_overpayment: args.overpayment,
            include_schedule: args.schedule,
        }
    }
}

#[derive(Args, Debug)]
pub struct CarFinanceArgs {
    #[arg(long, default_value_t = 20_000.0)]
    pub vehicle_price: f64,
    #[arg(long, default_value_t = 2_000.0)]
    pub deposit: f64,
    #[arg(long, default_value_t = 7.9, help = "Annual interest rate (%)")]
    pub rate: f64,
    #[arg(long, default_value_t = 48)]
    pub term_months: u32,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Optional final payment (PCP); 0 for hire purchase"
    )]
    pub balloon: f64,
}

impl From<CarFinanceArgs> for CarFinanceParameters {
    fn from(args: CarFinanceArgs) -> Self {
        Self {
            vehicle_price: args.vehicle_price,
            deposit: args.deposit,
            annual_rate_pct: args.rate,
            term_months: args.term_months,
            balloon_payment: args.balloon,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliContributionFrequency {
    Weekly,
    Monthly,
    Annually,
}

impl From<CliContributionFrequency> for ContributionFrequency {
    fn from(value: CliContributionFrequency) -> Self {
        match value {
            CliContributionFrequency::Weekly => ContributionFrequency::Weekly,
            CliContributionFrequency::Monthly => ContributionFrequency::Monthly,
            CliContributionFrequency::Annually => ContributionFrequency::Annually,
        }
    }
}

#[derive(Args, Debug)]
pub struct PensionArgs {
    #[arg(long, default_value_t = 10_000.0)]
    pub starting_balance: f64,
    #[arg(long, default_value_t = 200.0, help = "Own contribution per period")]
    pub own_contribution: f64,
    #[arg(long, default_value_t = 150.0, help = "Employer contribution per period")]
    pub employer_contribution: f64,
    #[arg(long, value_enum, default_value_t = CliContributionFrequency::Monthly)]
    pub frequency: CliContributionFrequency,
    #[arg(long, default_value_t = 70.0)]
    pub equities_pct: f64,
    #[arg(long, default_value_t = 7.0)]
    pub equities_return: f64,
    #[arg(long, default_value_t = 20.0)]
    pub bonds_pct: f64,
    #[arg(long, default_value_t = 3.0)]
    pub bonds_return: f64,
    #[arg(long, default_value_t = 10.0)]
    pub cash_pct: f64,
    #[arg(long, default_value_t = 1.5)]
    pub cash_return: f64,
    #[arg(long, default_value_t = 2.5)]
    pub inflation: f64,
    #[arg(long, default_value_t = 30)]
    pub start_age: u32,
    #[arg(long, default_value_t = 67)]
    pub end_age: u32,
    #[arg(long, default_value_t = 4.0)]
    pub withdrawal_rate: f64,
}

impl From<PensionArgs> for ProjectionParameters {
    fn from(args: PensionArgs) -> Self {
        Self {
            starting_balance: args.starting_balance,
            own_contribution: args.own_contribution,
            employer_contribution: args.employer_contribution,
            contribution_frequency: args.frequency.into(),
            allocations: vec![
                AssetAllocation::new("equities", args.equities_pct, args.equities_return),
                AssetAllocation::new("bonds", args.bonds_pct, args.bonds_return),
                AssetAllocation::new("cash", args.cash_pct, args.cash_return),
            ],
            inflation_rate_pct: args.inflation,
            start_age: args.start_age,
            end_age: args.end_age,
            withdrawal_rate_pct: args.withdrawal_rate,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliCompounding {
    Annually,
    Quarterly,
    Monthly,
    Daily,
}

impl From<CliCompounding> for CompoundingFrequency {
    fn from(value: CliCompounding) -> Self {
        match value {
            CliCompounding::Annually => CompoundingFrequency::Annually,
            CliCompounding::Quarterly => CompoundingFrequency::Quarterly,
            CliCompounding::Monthly => CompoundingFrequency::Monthly,
            CliCompounding::Daily => CompoundingFrequency::Daily,
        }
    }
}

#[derive(Args, Debug)]
pub struct CompoundArgs {
    #[arg(long, default_value_t = 5_000.0)]
    pub initial: f64,
    #[arg(long, default_value_t = 100.0)]
    pub monthly: f64,
    #[arg(long, default_value_t = 5.0, help = "Annual interest rate (%)")]
    pub rate: f64,
    #[arg(long, default_value_t = 10)]
    pub years: u32,
    #[arg(long, value_enum, default_value_t = CliCompounding::Monthly)]
    pub compounding: CliCompounding,
    #[arg(long, default_value_t = 0.0)]
    pub inflation: f64,
}

impl From<CompoundArgs> for CompoundParameters {
    fn from(args: CompoundArgs) -> Self {
        Self {
            initial_amount: args.initial,
            monthly_contribution: args.monthly,
            annual_rate_pct: args.rate,
            years: args.years,
            compounding: args.compounding.into(),
            inflation_rate_pct: args.inflation,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliDirection {
    Grow,
    Deflate,
}

impl From<CliDirection> for AdjustDirection {
    fn from(value: CliDirection) -> Self {
        match value {
            CliDirection::Grow => AdjustDirection::Grow,
            CliDirection::Deflate => AdjustDirection::Deflate,
        }
    }
}

#[derive(Args, Debug)]
pub struct InflationArgs {
    #[arg(long, default_value_t = 1_000.0)]
    pub amount: f64,
    #[arg(long, default_value_t = 2000)]
    pub start_year: i32,
    #[arg(long, default_value_t = 2024)]
    pub end_year: i32,
    #[arg(
        long,
        value_enum,
        default_value_t = CliDirection::Grow,
        help = "grow: start-year money in end-year terms; deflate: end-year money in start-year terms"
    )]
    pub direction: CliDirection,
    #[arg(long, env = "FINCALC_INFLATION_TABLE")]
    pub inflation_table: Option<PathBuf>,
}

impl From<&InflationArgs> for InflationParameters {
    fn from(args: &InflationArgs) -> Self {
        Self {
            amount: args.amount,
            start_year: args.start_year,
            end_year: args.end_year,
            direction: args.direction.into(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliStudentLoan {
    None,
    Plan1,
    Plan2,
    Plan4,
    Plan5,
}

impl From<CliStudentLoan> for StudentLoanPlan {
    fn from(value: CliStudentLoan) -> Self {
        match value {
            CliStudentLoan::None => StudentLoanPlan::None,
            CliStudentLoan::Plan1 => StudentLoanPlan::Plan1,
            CliStudentLoan::Plan2 => StudentLoanPlan::Plan2,
            CliStudentLoan::Plan4 => StudentLoanPlan::Plan4,
            CliStudentLoan::Plan5 => StudentLoanPlan::Plan5,
        }
    }
}

#[derive(Args, Debug)]
pub struct TakeHomeArgs {
    #[arg(long, default_value_t = 30_000.0)]
    pub salary: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Salary sacrifice pension contribution (%)"
    )]
    pub pension: f64,
    #[arg(long, value_enum, default_value_t = CliStudentLoan::None)]
    pub student_loan: CliStudentLoan,
    #[arg(long)]
    pub postgraduate_loan: bool,
    #[arg(long, default_value_t = 12_570.0)]
    pub personal_allowance: f64,
}

impl From<TakeHomeArgs> for TakeHomeParameters {
    fn from(args: TakeHomeArgs) -> Self {
        Self {
            gross_salary: args.salary,
            pension_contribution_pct: args.pension,
            student_loan: args.student_loan.into(),
            postgraduate_loan: args.postgraduate_loan,
            bands: UkTaxBands {
                personal_allowance: args.personal_allowance,
                ..UkTaxBands::default()
            },
        }
    }
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve(args) => {
            let inflation = load_inflation_series(args.inflation_table.as_deref())?;
            run_http_server(args.port, AppState::new(inflation))
                .await
                .map_err(CliError::Server)
        }
        command => {
            println!("{}", render(command)?);
            Ok(())
        }
    }
}

/// Runs one calculator and returns its result as pretty JSON.
pub fn render(command: Command) -> Result<String, CliError> {
    match command {
        Command::Serve(_) => Ok(String::new()),
        Command::Mortgage(args) => to_json(&calculate_mortgage(&args.into())?),
        Command::CarFinance(args) => to_json(&calculate_car_finance(&args.into())?),
        Command::Pension(args) => to_json(&project_growth(&args.into())?),
        Command::Compound(args) => to_json(&project_compound(&args.into())?),
        Command::Inflation(args) => {
            let series = load_inflation_series(args.inflation_table.as_deref())?;
            to_json(&adjust_for_inflation(&series, &(&args).into())?)
        }
        Command::TakeHome(args) => to_json(&calculate_take_home(&args.into())?),
    }
}

pub fn load_inflation_series(path: Option<&Path>) -> Result<InflationSeries, CliError> {
    let Some(path) = path else {
        return Ok(InflationSeries::uk_cpi());
    };
    let json = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = InflationSeries::from_json(&json)?;
    let years = series.supported_years();
    tracing::info!(
        path = %path.display(),
        first_year = *years.start(),
        last_year = *years.end(),
        "loaded inflation table"
    );
    Ok(series)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}
