use serde::Deserialize;

use crate::core::{
    AdjustDirection, AssetAllocation, CarFinanceParameters, CompoundParameters,
    CompoundingFrequency, ContributionFrequency, GoalSolveConfig, InflationParameters,
    MortgageParameters, ProjectionParameters, StudentLoanPlan, TakeHomeParameters,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct MortgagePayload {
    property_price: Option<f64>,
    deposit: Option<f64>,
    annual_rate: Option<f64>,
    term_years: Option<u32>,
    monthly_overpayment: Option<f64>,
    include_schedule: Option<bool>,
}

impl From<MortgagePayload> for MortgageParameters {
    fn from(payload: MortgagePayload) -> Self {
        let mut params = MortgageParameters::default();
        if let Some(v) = payload.property_price {
            params.property_price = v;
        }
        if let Some(v) = payload.deposit {
            params.deposit = v;
        }
        if let Some(v) = payload.annual_rate {
            params.annual_rate_pct = v;
        }
        if let Some(v) = payload.term_years {
            params.term_years = v;
        }
        if let Some(v) = payload.monthly_overpayment {
            params.monthly_overpayment = v;
        }
        if let Some(v) = payload.include_schedule {
            params.include_schedule = v;
        }
        params
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct CarFinancePayload {
    vehicle_price: Option<f64>,
    deposit: Option<f64>,
    annual_rate: Option<f64>,
    term_months: Option<u32>,
    balloon: Option<f64>,
}

impl From<CarFinancePayload> for CarFinanceParameters {
    fn from(payload: CarFinancePayload) -> Self {
        let mut params = CarFinanceParameters::default();
        if let Some(v) = payload.vehicle_price {
            params.vehicle_price = v;
        }
        if let Some(v) = payload.deposit {
            params.deposit = v;
        }
        if let Some(v) = payload.annual_rate {
            params.annual_rate_pct = v;
        }
        if let Some(v) = payload.term_months {
            params.term_months = v;
        }
        if let Some(v) = payload.balloon {
            params.balloon_payment = v;
        }
        params
    }
}

/// Query strings cannot carry a list, so the three standard asset classes get
/// their own keys. A JSON body may send a full `allocations` array instead.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct PensionPayload {
    starting_balance: Option<f64>,
    own_contribution: Option<f64>,
    employer_contribution: Option<f64>,
    frequency: Option<ContributionFrequency>,
    equities_pct: Option<f64>,
    equities_return: Option<f64>,
    bonds_pct: Option<f64>,
    bonds_return: Option<f64>,
    cash_pct: Option<f64>,
    cash_return: Option<f64>,
    allocations: Option<Vec<AssetAllocation>>,
    inflation_rate: Option<f64>,
    start_age: Option<u32>,
    end_age: Option<u32>,
    withdrawal_rate: Option<f64>,
}

impl From<PensionPayload> for ProjectionParameters {
    fn from(payload: PensionPayload) -> Self {
        let mut params = ProjectionParameters::default();
        if let Some(v) = payload.starting_balance {
            params.starting_balance = v;
        }
        if let Some(v) = payload.own_contribution {
            params.own_contribution = v;
        }
        if let Some(v) = payload.employer_contribution {
            params.employer_contribution = v;
        }
        if let Some(v) = payload.frequency {
            params.contribution_frequency = v;
        }
        if let Some(v) = payload.inflation_rate {
            params.inflation_rate_pct = v;
        }
        if let Some(v) = payload.start_age {
            params.start_age = v;
        }
        if let Some(v) = payload.end_age {
            params.end_age = v;
        }
        if let Some(v) = payload.withdrawal_rate {
            params.withdrawal_rate_pct = v;
        }

        let overrides = [
            ("equities", payload.equities_pct, payload.equities_return),
            ("bonds", payload.bonds_pct, payload.bonds_return),
            ("cash", payload.cash_pct, payload.cash_return),
        ];
        for (name, pct, annual_return) in overrides {
            if let Some(allocation) = params.allocations.iter_mut().find(|a| a.name == name) {
                if let Some(v) = pct {
                    allocation.allocation_pct = v;
                }
                if let Some(v) = annual_return {
                    allocation.annual_return_pct = v;
                }
            }
        }
        if let Some(allocations) = payload.allocations {
            params.allocations = allocations;
        }
        params
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct CompoundPayload {
    initial_amount: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_rate: Option<f64>,
    years: Option<u32>,
    compounding: Option<CompoundingFrequency>,
    inflation_rate: Option<f64>,
}

impl From<CompoundPayload> for CompoundParameters {
    fn from(payload: CompoundPayload) -> Self {
        let mut params = CompoundParameters::default();
        if let Some(v) = payload.initial_amount {
            params.initial_amount = v;
        }
        if let Some(v) = payload.monthly_contribution {
            params.monthly_contribution = v;
        }
        if let Some(v) = payload.annual_rate {
            params.annual_rate_pct = v;
        }
        if let Some(v) = payload.years {
            params.years = v;
        }
        if let Some(v) = payload.compounding {
            params.compounding = v;
        }
        if let Some(v) = payload.inflation_rate {
            params.inflation_rate_pct = v;
        }
        params
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct InflationPayload {
    amount: Option<f64>,
    start_year: Option<i32>,
    end_year: Option<i32>,
    direction: Option<AdjustDirection>,
}

impl From<InflationPayload> for InflationParameters {
    fn from(payload: InflationPayload) -> Self {
        let mut params = InflationParameters::default();
        if let Some(v) = payload.amount {
            params.amount = v;
        }
        if let Some(v) = payload.start_year {
            params.start_year = v;
        }
        if let Some(v) = payload.end_year {
            params.end_year = v;
        }
        if let Some(v) = payload.direction {
            params.direction = v;
        }
        params
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct TakeHomePayload {
    gross_salary: Option<f64>,
    pension_pct: Option<f64>,
    student_loan: Option<StudentLoanPlan>,
    postgraduate_loan: Option<bool>,
    personal_allowance: Option<f64>,
    allowance_taper_start: Option<f64>,
    basic_rate_limit: Option<f64>,
    higher_rate_limit: Option<f64>,
    basic_rate: Option<f64>,
    higher_rate: Option<f64>,
    additional_rate: Option<f64>,
}

impl From<TakeHomePayload> for TakeHomeParameters {
    fn from(payload: TakeHomePayload) -> Self {
        let mut params = TakeHomeParameters::default();
        if let Some(v) = payload.gross_salary {
            params.gross_salary = v;
        }
        if let Some(v) = payload.pension_pct {
            params.pension_contribution_pct = v;
        }
        if let Some(v) = payload.student_loan {
            params.student_loan = v;
        }
        if let Some(v) = payload.postgraduate_loan {
            params.postgraduate_loan = v;
        }
        if let Some(v) = payload.personal_allowance {
            params.bands.personal_allowance = v;
        }
        if let Some(v) = payload.allowance_taper_start {
            params.bands.allowance_taper_start = v;
        }
        if let Some(v) = payload.basic_rate_limit {
            params.bands.basic_rate_limit = v;
        }
        if let Some(v) = payload.higher_rate_limit {
            params.bands.higher_rate_limit = v;
        }
        if let Some(v) = payload.basic_rate {
            params.bands.basic_rate_pct = v;
        }
        if let Some(v) = payload.higher_rate {
            params.bands.higher_rate_pct = v;
        }
        if let Some(v) = payload.additional_rate {
            params.bands.additional_rate_pct = v;
        }
        params
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct SolveOverpaymentPayload {
    property_price: Option<f64>,
    deposit: Option<f64>,
    annual_rate: Option<f64>,
    term_years: Option<u32>,
    target_months: Option<u32>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

#[derive(Debug)]
pub(crate) struct OverpaymentGoal {
    pub mortgage: MortgageParameters,
    pub target_months: u32,
    pub config: GoalSolveConfig,
}

impl TryFrom<SolveOverpaymentPayload> for OverpaymentGoal {
    type Error = String;

    fn try_from(payload: SolveOverpaymentPayload) -> Result<Self, Self::Error> {
        let target_months = payload
            .target_months
            .ok_or_else(|| "targetMonths is required".to_string())?;
        let mortgage = MortgageParameters::from(MortgagePayload {
            property_price: payload.property_price,
            deposit: payload.deposit,
            annual_rate: payload.annual_rate,
            term_years: payload.term_years,
            ..MortgagePayload::default()
        });
        Ok(Self {
            mortgage,
            target_months,
            config: search_config(
                payload.search_min,
                payload.search_max,
                payload.tolerance,
                payload.max_iterations,
            ),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct SolveContributionPayload {
    starting_balance: Option<f64>,
    employer_contribution: Option<f64>,
    frequency: Option<ContributionFrequency>,
    equities_pct: Option<f64>,
    equities_return: Option<f64>,
    bonds_pct: Option<f64>,
    bonds_return: Option<f64>,
    cash_pct: Option<f64>,
    cash_return: Option<f64>,
    allocations: Option<Vec<AssetAllocation>>,
    inflation_rate: Option<f64>,
    start_age: Option<u32>,
    end_age: Option<u32>,
    target_pot: Option<f64>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

#[derive(Debug)]
pub(crate) struct ContributionGoal {
    pub projection: ProjectionParameters,
    pub target_pot: f64,
    pub config: GoalSolveConfig,
}

impl TryFrom<SolveContributionPayload> for ContributionGoal {
    type Error = String;

    fn try_from(payload: SolveContributionPayload) -> Result<Self, Self::Error> {
        let target_pot = payload
            .target_pot
            .ok_or_else(|| "targetPot is required".to_string())?;
        let projection = ProjectionParameters::from(PensionPayload {
            starting_balance: payload.starting_balance,
            employer_contribution: payload.employer_contribution,
            frequency: payload.frequency,
            equities_pct: payload.equities_pct,
            equities_return: payload.equities_return,
            bonds_pct: payload.bonds_pct,
            bonds_return: payload.bonds_return,
            cash_pct: payload.cash_pct,
            cash_return: payload.cash_return,
            allocations: payload.allocations,
            inflation_rate: payload.inflation_rate,
            start_age: payload.start_age,
            end_age: payload.end_age,
            ..PensionPayload::default()
        });
        Ok(Self {
            projection,
            target_pot,
            config: search_config(
                payload.search_min,
                payload.search_max,
                payload.tolerance,
                payload.max_iterations,
            ),
        })
    }
}

fn search_config(
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
) -> GoalSolveConfig {
    let defaults = GoalSolveConfig::default();
    GoalSolveConfig {
        search_min: search_min.unwrap_or(defaults.search_min),
        search_max: search_max.unwrap_or(defaults.search_max),
        tolerance: tolerance.unwrap_or(defaults.tolerance),
        max_iterations: max_iterations.unwrap_or(defaults.max_iterations),
    }
}
