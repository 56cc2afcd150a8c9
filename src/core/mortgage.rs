use super::amortization::{
    amortization_schedule, periodic_payment, periodic_rate, rate_sensitivity,
    simulate_overpayment, summarize_by_year,
};
use super::error::{CalcError, CalcResult, require_non_negative, require_positive};
use super::types::{
    LoanParameters, MAX_TERM_PERIODS, MAX_TERM_YEARS, MONTHS_PER_YEAR, MortgageParameters,
    MortgageResult, OverpaymentSavings,
};

pub const SENSITIVITY_DELTA_PCT: f64 = 1.0;

pub fn calculate_mortgage(params: &MortgageParameters) -> CalcResult<MortgageResult> {
    validate_mortgage(params)?;

    let loan_amount = params.property_price - params.deposit;
    let term_months = term_months(params.term_years)?;
    let rate = periodic_rate(params.annual_rate_pct, MONTHS_PER_YEAR);

    let monthly_payment = periodic_payment(loan_amount, rate, term_months)?;
    let total_repaid = monthly_payment * term_months as f64;
    let total_interest = total_repaid - loan_amount;

    let sensitivity = rate_sensitivity(
        loan_amount,
        params.annual_rate_pct,
        term_months,
        MONTHS_PER_YEAR,
        SENSITIVITY_DELTA_PCT,
    )?;

    let overpayment = if params.monthly_overpayment > 0.0 {
        let baseline = simulate_overpayment(loan_amount, rate, monthly_payment, 0.0, term_months)?;
        let faster = simulate_overpayment(
            loan_amount,
            rate,
            monthly_payment,
            params.monthly_overpayment,
            term_months,
        )?;
        Some(OverpaymentSavings {
            monthly_overpayment: params.monthly_overpayment,
            months_to_payoff: faster.periods,
            months_saved: baseline.periods.saturating_sub(faster.periods),
            total_interest: faster.total_interest,
            interest_saved: (baseline.total_interest - faster.total_interest).max(0.0),
        })
    } else {
        None
    };

    let yearly_schedule = if params.include_schedule {
        let schedule = amortization_schedule(&LoanParameters {
            principal: loan_amount,
            annual_rate_pct: params.annual_rate_pct,
            term_periods: term_months,
            periods_per_year: MONTHS_PER_YEAR,
            overpayment: params.monthly_overpayment,
        })?;
        summarize_by_year(&schedule, MONTHS_PER_YEAR)
    } else {
        Vec::new()
    };

    Ok(MortgageResult {
        loan_amount,
        loan_to_value_pct: loan_amount / params.property_price * 100.0,
        term_months,
        monthly_payment,
        total_repaid,
        total_interest,
        sensitivity,
        overpayment,
        yearly_schedule,
    })
}

pub(crate) fn validate_mortgage(params: &MortgageParameters) -> CalcResult<()> {
    require_positive("property price", params.property_price)?;
    require_non_negative("deposit", params.deposit)?;
    require_non_negative("annual rate", params.annual_rate_pct)?;
    require_non_negative("monthly overpayment", params.monthly_overpayment)?;
    if params.deposit >= params.property_price {
        return Err(CalcError::invalid(
            "deposit",
            "must be less than the property price",
        ));
    }
    term_months(params.term_years)?;
    Ok(())
}

pub(crate) fn term_months(term_years: u32) -> CalcResult<u32> {
    if term_years == 0 {
        return Err(CalcError::invalid("term", "must be > 0"));
    }
    term_years
        .checked_mul(MONTHS_PER_YEAR)
        .filter(|months| *months <= MAX_TERM_PERIODS)
        .ok_or_else(|| CalcError::invalid("term", format!("must be <= {MAX_TERM_YEARS} years")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn default_mortgage_matches_reference_figures() {
        let result = calculate_mortgage(&MortgageParameters::default()).expect("valid");
        assert_approx_tol(result.loan_amount, 225_000.0, 1e-9);
        assert_approx_tol(result.loan_to_value_pct, 90.0, 1e-9);
        assert_eq!(result.term_months, 300);
        assert_approx_tol(result.monthly_payment, 1_250.62, 0.05);
        assert_approx_tol(
            result.total_interest,
            result.monthly_payment * 300.0 - 225_000.0,
            1e-6,
        );
        assert!(result.overpayment.is_none());
        assert!(result.yearly_schedule.is_empty());
    }

    #[test]
    fn sensitivity_brackets_base_payment() {
        let result = calculate_mortgage(&MortgageParameters::default()).expect("valid");
        let s = result.sensitivity;
        assert_approx_tol(s.lower_rate_pct, 3.5, 1e-12);
        assert_approx_tol(s.higher_rate_pct, 5.5, 1e-12);
        assert!(s.lower_payment < s.base_payment);
        assert!(s.higher_payment > s.base_payment);
    }

    #[test]
    fn overpayment_reports_time_and_interest_saved() {
        let params = MortgageParameters {
            monthly_overpayment: 200.0,
            include_schedule: true,
            ..MortgageParameters::default()
        };
        let result = calculate_mortgage(&params).expect("valid");
        let savings = result.overpayment.expect("overpayment outcome");
        assert!(savings.months_to_payoff < 300);
        assert_eq!(savings.months_saved, 300 - savings.months_to_payoff);
        assert!(savings.interest_saved > 0.0);
        assert_approx_tol(
            savings.total_interest + savings.interest_saved,
            result.total_interest,
            1e-4,
        );
        assert_eq!(
            result.yearly_schedule.len() as u32,
            savings.months_to_payoff.div_ceil(12)
        );
    }

    #[test]
    fn deposit_covering_price_is_rejected() {
        let params = MortgageParameters {
            deposit: 250_000.0,
            ..MortgageParameters::default()
        };
        let err = calculate_mortgage(&params).expect_err("must reject");
        assert_eq!(err.field(), Some("deposit"));
    }

    #[test]
    fn zero_term_is_rejected() {
        let params = MortgageParameters {
            term_years: 0,
            ..MortgageParameters::default()
        };
        assert!(calculate_mortgage(&params).is_err());
    }

    #[test]
    fn term_is_capped_at_one_hundred_years() {
        let longest = MortgageParameters {
            term_years: MAX_TERM_YEARS,
            ..MortgageParameters::default()
        };
        assert_eq!(calculate_mortgage(&longest).expect("valid").term_months, 1_200);

        for term_years in [MAX_TERM_YEARS + 1, 400_000_000, u32::MAX] {
            let params = MortgageParameters {
                term_years,
                ..MortgageParameters::default()
            };
            let err = calculate_mortgage(&params).expect_err("must reject");
            assert_eq!(err.field(), Some("term"));
        }
    }
}
