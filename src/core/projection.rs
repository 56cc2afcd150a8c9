use super::error::{
    CalcError, CalcResult, require_at_most, require_finite, require_non_negative,
};
use super::types::{
    AssetAllocation, AssetValue, MAX_AGE_SPAN, ProjectionParameters, ProjectionResult,
    ProjectionYearEntry,
};

// Allocations arrive as user-entered percentages; anything further from 100 is a real mismatch.
const ALLOCATION_SUM_TOLERANCE: f64 = 1e-9;

pub fn blended_return(allocations: &[AssetAllocation]) -> f64 {
    allocations
        .iter()
        .map(|a| a.allocation_pct / 100.0 * a.annual_return_pct / 100.0)
        .sum()
}

pub fn validate_allocations(allocations: &[AssetAllocation]) -> CalcResult<()> {
    if allocations.is_empty() {
        return Err(CalcError::invalid(
            "allocations",
            "at least one asset class is required",
        ));
    }
    for allocation in allocations {
        require_finite("annual return", allocation.annual_return_pct)?;
        if !(0.0..=100.0).contains(&allocation.allocation_pct) {
            return Err(CalcError::invalid(
                "allocations",
                format!("{} allocation must be between 0 and 100", allocation.name),
            ));
        }
    }

    let total: f64 = allocations.iter().map(|a| a.allocation_pct).sum();
    if (total - 100.0).abs() > ALLOCATION_SUM_TOLERANCE {
        return Err(CalcError::invalid(
            "allocations",
            format!("must sum to 100, got {total}"),
        ));
    }
    Ok(())
}

pub fn project_growth(params: &ProjectionParameters) -> CalcResult<ProjectionResult> {
    validate_projection(params)?;

    let blended = blended_return(&params.allocations);
    let inflation = params.inflation_rate_pct / 100.0;
    let periods_per_year = params.contribution_frequency.periods_per_year() as f64;
    let annual_own = params.own_contribution * periods_per_year;
    let annual_employer = params.employer_contribution * periods_per_year;
    let years = params.end_age - params.start_age;

    let mut balance = params.starting_balance;
    let mut entries = Vec::with_capacity(years as usize + 1);
    entries.push(year_entry(params, 0, balance, balance, 0.0, 0.0, 0.0));

    let mut total_growth = 0.0;
    let mut price_level = 1.0;
    for year in 1..=years {
        let growth = balance * blended;
        balance += growth + annual_own + annual_employer;
        total_growth += growth;

        price_level *= 1.0 + inflation;
        let real = balance / price_level;
        entries.push(year_entry(
            params,
            year,
            balance,
            real,
            annual_own,
            annual_employer,
            growth,
        ));
    }

    let final_real = entries.last().map(|e| e.real_balance).unwrap_or(balance);
    let withdrawal_rate = params.withdrawal_rate_pct / 100.0;

    Ok(ProjectionResult {
        blended_return_pct: blended * 100.0,
        final_nominal: balance,
        final_real,
        total_own_contributions: annual_own * years as f64,
        total_employer_contributions: annual_employer * years as f64,
        total_growth,
        sustainable_income_nominal: balance * withdrawal_rate,
        sustainable_income_real: final_real * withdrawal_rate,
        years: entries,
    })
}

fn validate_projection(params: &ProjectionParameters) -> CalcResult<()> {
    require_non_negative("starting balance", params.starting_balance)?;
    require_non_negative("own contribution", params.own_contribution)?;
    require_non_negative("employer contribution", params.employer_contribution)?;
    require_non_negative("withdrawal rate", params.withdrawal_rate_pct)?;
    if require_finite("inflation rate", params.inflation_rate_pct)? <= -100.0 {
        return Err(CalcError::invalid("inflation rate", "must be > -100"));
    }
    if params.end_age <= params.start_age {
        return Err(CalcError::invalid(
            "end age",
            "must be greater than the start age",
        ));
    }
    require_at_most("end age", params.end_age - params.start_age, MAX_AGE_SPAN)?;
    validate_allocations(&params.allocations)
}

fn year_entry(
    params: &ProjectionParameters,
    year: u32,
    nominal: f64,
    real: f64,
    own: f64,
    employer: f64,
    growth: f64,
) -> ProjectionYearEntry {
    ProjectionYearEntry {
        year,
        age: params.start_age + year,
        nominal_balance: nominal,
        real_balance: real,
        own_contribution: own,
        employer_contribution: employer,
        growth,
        asset_values: params
            .allocations
            .iter()
            .map(|a| AssetValue {
                name: a.name.clone(),
                value: nominal * a.allocation_pct / 100.0,
            })
            .collect(),
    }
}
