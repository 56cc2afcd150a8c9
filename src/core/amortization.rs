use super::error::{
    CalcError, CalcResult, require_at_most, require_finite, require_non_negative,
    require_positive,
};
use super::types::{
    AmortizationScheduleEntry, LoanParameters, MAX_TERM_PERIODS, OverpaymentOutcome,
    RateSensitivity, YearSummary,
};

// Below this the balance is treated as repaid; absorbs rounding in the final period.
const BALANCE_EPS: f64 = 1e-6;
pub(super) const ZERO_RATE_EPS: f64 = 1e-12;

pub fn periodic_rate(annual_rate_pct: f64, periods_per_year: u32) -> f64 {
    if periods_per_year == 0 {
        return 0.0;
    }
    annual_rate_pct / 100.0 / periods_per_year as f64
}

pub fn periodic_payment(principal: f64, rate: f64, periods: u32) -> CalcResult<f64> {
    if periods == 0 {
        return Err(CalcError::invalid("term", "must be > 0"));
    }
    require_at_most("term", periods, MAX_TERM_PERIODS)?;
    require_positive("principal", principal)?;
    require_non_negative("rate", rate)?;

    if rate < ZERO_RATE_EPS {
        return Ok(principal / periods as f64);
    }

    let growth = (1.0 + rate).powi(period_exponent(periods)?);
    Ok(principal * rate * growth / (growth - 1.0))
}

pub fn loan_payment(params: &LoanParameters) -> CalcResult<f64> {
    validate_loan(params)?;
    periodic_payment(
        params.principal,
        periodic_rate(params.annual_rate_pct, params.periods_per_year),
        params.term_periods,
    )
}

pub fn simulate_overpayment(
    principal: f64,
    rate: f64,
    payment: f64,
    overpayment: f64,
    max_periods: u32,
) -> CalcResult<OverpaymentOutcome> {
    require_non_negative("principal", principal)?;
    require_non_negative("rate", rate)?;
    require_finite("payment", payment)?;
    require_non_negative("overpayment", overpayment)?;
    require_at_most("max periods", max_periods, MAX_TERM_PERIODS)?;

    let mut total_interest = 0.0;
    let mut periods = 0;
    let remaining_balance =
        run_schedule(principal, rate, payment, overpayment, max_periods, |entry| {
            total_interest += entry.interest;
            periods = entry.period;
        });

    Ok(OverpaymentOutcome {
        total_interest,
        periods,
        remaining_balance,
    })
}

pub fn amortization_schedule(params: &LoanParameters) -> CalcResult<Vec<AmortizationScheduleEntry>> {
    let payment = loan_payment(params)?;
    let rate = periodic_rate(params.annual_rate_pct, params.periods_per_year);

    let mut entries = Vec::with_capacity(params.term_periods as usize);
    run_schedule(
        params.principal,
        rate,
        payment,
        params.overpayment,
        params.term_periods,
        |entry| entries.push(entry),
    );
    Ok(entries)
}

pub fn summarize_by_year(
    entries: &[AmortizationScheduleEntry],
    periods_per_year: u32,
) -> Vec<YearSummary> {
    let chunk = periods_per_year.max(1) as usize;
    entries
        .chunks(chunk)
        .enumerate()
        .map(|(idx, periods)| YearSummary {
            year: idx as u32 + 1,
            payments: periods.iter().map(|e| e.payment).sum(),
            interest: periods.iter().map(|e| e.interest).sum(),
            principal: periods.iter().map(|e| e.principal).sum(),
            closing_balance: periods.last().map(|e| e.balance).unwrap_or(0.0),
        })
        .collect()
}

pub fn rate_sensitivity(
    principal: f64,
    annual_rate_pct: f64,
    periods: u32,
    periods_per_year: u32,
    delta_pct: f64,
) -> CalcResult<RateSensitivity> {
    require_non_negative("annual rate", annual_rate_pct)?;
    require_non_negative("rate delta", delta_pct)?;

    let payment_at = |rate_pct: f64| {
        periodic_payment(principal, periodic_rate(rate_pct, periods_per_year), periods)
    };

    let lower_rate_pct = (annual_rate_pct - delta_pct).max(0.0);
    let higher_rate_pct = annual_rate_pct + delta_pct;

    Ok(RateSensitivity {
        base_rate_pct: annual_rate_pct,
        base_payment: payment_at(annual_rate_pct)?,
        lower_rate_pct,
        lower_payment: payment_at(lower_rate_pct)?,
        higher_rate_pct,
        higher_payment: payment_at(higher_rate_pct)?,
    })
}

fn validate_loan(params: &LoanParameters) -> CalcResult<()> {
    require_positive("principal", params.principal)?;
    require_non_negative("annual rate", params.annual_rate_pct)?;
    require_non_negative("overpayment", params.overpayment)?;
    if params.term_periods == 0 {
        return Err(CalcError::invalid("term", "must be > 0"));
    }
    require_at_most("term", params.term_periods, MAX_TERM_PERIODS)?;
    if params.periods_per_year == 0 {
        return Err(CalcError::invalid("periods per year", "must be > 0"));
    }
    Ok(())
}

pub(super) fn period_exponent(periods: u32) -> CalcResult<i32> {
    i32::try_from(periods).map_err(|_| CalcError::invalid("term", "too many periods"))
}

/// Steps the balance forward one period at a time, handing each period to
/// `on_period`, and returns whatever balance is left when `max_periods` runs out.
///
/// A period whose principal portion covers the remaining balance is clamped to
/// that balance: interest for the period is still `balance * rate`, and the
/// unused part of the payment is never charged.
fn run_schedule(
    principal: f64,
    rate: f64,
    payment: f64,
    overpayment: f64,
    max_periods: u32,
    mut on_period: impl FnMut(AmortizationScheduleEntry),
) -> f64 {
    let mut balance = principal;
    let mut period = 0;

    while balance > BALANCE_EPS && period < max_periods {
        period += 1;
        let interest = balance * rate;
        let principal_paid = payment - interest + overpayment;

        if principal_paid >= balance - BALANCE_EPS {
            on_period(AmortizationScheduleEntry {
                period,
                payment: interest + balance,
                interest,
                principal: balance,
                balance: 0.0,
            });
            return 0.0;
        }

        balance -= principal_paid;
        on_period(AmortizationScheduleEntry {
            period,
            payment: payment + overpayment,
            interest,
            principal: principal_paid,
            balance,
        });
    }

    balance.max(0.0)
}
