use super::amortization::periodic_rate;
use super::error::{
    CalcError, CalcResult, require_at_most, require_finite, require_non_negative,
};
use super::types::{
    CompoundParameters, CompoundResult, CompoundYearEntry, MAX_COMPOUND_YEARS, MONTHS_PER_YEAR,
};

pub fn project_compound(params: &CompoundParameters) -> CalcResult<CompoundResult> {
    require_non_negative("initial amount", params.initial_amount)?;
    require_non_negative("monthly contribution", params.monthly_contribution)?;
    require_non_negative("annual rate", params.annual_rate_pct)?;
    if require_finite("inflation rate", params.inflation_rate_pct)? <= -100.0 {
        return Err(CalcError::invalid("inflation rate", "must be > -100"));
    }
    if params.years == 0 {
        return Err(CalcError::invalid("years", "must be > 0"));
    }
    require_at_most("years", params.years, MAX_COMPOUND_YEARS)?;

    let periods_per_year = params.compounding.periods_per_year();
    let period_rate = periodic_rate(params.annual_rate_pct, periods_per_year);
    let period_contribution =
        params.monthly_contribution * MONTHS_PER_YEAR as f64 / periods_per_year as f64;
    let inflation = params.inflation_rate_pct / 100.0;

    let mut balance = params.initial_amount;
    let mut total_contributions = params.initial_amount;
    let mut total_interest = 0.0;
    let mut price_level = 1.0;

    let mut years = Vec::with_capacity(params.years as usize + 1);
    years.push(CompoundYearEntry {
        year: 0,
        balance,
        real_balance: balance,
        total_contributions,
        total_interest,
        interest_this_year: 0.0,
    });

    for year in 1..=params.years {
        let mut interest_this_year = 0.0;
        for _ in 0..periods_per_year {
            let interest = balance * period_rate;
            balance += interest + period_contribution;
            interest_this_year += interest;
            total_contributions += period_contribution;
        }
        total_interest += interest_this_year;
        price_level *= 1.0 + inflation;

        years.push(CompoundYearEntry {
            year,
            balance,
            real_balance: balance / price_level,
            total_contributions,
            total_interest,
            interest_this_year,
        });
    }

    let final_real_balance = years.last().map(|y| y.real_balance).unwrap_or(balance);

    Ok(CompoundResult {
        final_balance: balance,
        final_real_balance,
        total_contributions,
        total_interest,
        years,
    })
}
