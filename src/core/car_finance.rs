use super::amortization::{ZERO_RATE_EPS, period_exponent, periodic_rate};
use super::error::{
    CalcError, CalcResult, require_at_most, require_non_negative, require_positive,
};
use super::types::{
    AmortizationScheduleEntry, CarFinanceParameters, CarFinanceResult, MAX_TERM_PERIODS,
    MONTHS_PER_YEAR,
};

pub fn calculate_car_finance(params: &CarFinanceParameters) -> CalcResult<CarFinanceResult> {
    require_positive("vehicle price", params.vehicle_price)?;
    require_non_negative("deposit", params.deposit)?;
    require_non_negative("annual rate", params.annual_rate_pct)?;
    require_non_negative("balloon payment", params.balloon_payment)?;
    if params.term_months == 0 {
        return Err(CalcError::invalid("term", "must be > 0"));
    }
    require_at_most("term", params.term_months, MAX_TERM_PERIODS)?;
    if params.deposit >= params.vehicle_price {
        return Err(CalcError::invalid(
            "deposit",
            "must be less than the vehicle price",
        ));
    }

    let amount_financed = params.vehicle_price - params.deposit;
    if params.balloon_payment >= amount_financed {
        return Err(CalcError::invalid(
            "balloon payment",
            "must be less than the amount financed",
        ));
    }

    let rate = periodic_rate(params.annual_rate_pct, MONTHS_PER_YEAR);
    let monthly_payment = balloon_payment_amount(
        amount_financed,
        params.balloon_payment,
        rate,
        params.term_months,
    )?;
    let schedule = balloon_schedule(amount_financed, rate, monthly_payment, params.term_months);

    let total_payable =
        params.deposit + monthly_payment * params.term_months as f64 + params.balloon_payment;

    Ok(CarFinanceResult {
        amount_financed,
        monthly_payment,
        balloon_payment: params.balloon_payment,
        total_payable,
        total_interest: total_payable - params.vehicle_price,
        schedule,
    })
}

// Level payment that leaves exactly `balloon` outstanding after `periods`.
fn balloon_payment_amount(amount: f64, balloon: f64, rate: f64, periods: u32) -> CalcResult<f64> {
    if rate < ZERO_RATE_EPS {
        return Ok((amount - balloon) / periods as f64);
    }
    let discount = (1.0 + rate).powi(-period_exponent(periods)?);
    Ok((amount - balloon * discount) * rate / (1.0 - discount))
}

fn balloon_schedule(
    amount: f64,
    rate: f64,
    payment: f64,
    periods: u32,
) -> Vec<AmortizationScheduleEntry> {
    let mut balance = amount;
    let mut entries = Vec::with_capacity(periods as usize);
    for period in 1..=periods {
        let interest = balance * rate;
        let mut principal = payment - interest;
        let mut paid = payment;
        if period == periods {
            // The final instalment settles whatever is left, balloon included.
            principal = balance;
            paid = interest + balance;
        }
        balance = (balance - principal).max(0.0);
        entries.push(AmortizationScheduleEntry {
            period,
            payment: paid,
            interest,
            principal,
            balance,
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn hire_purchase_without_balloon_is_a_plain_annuity() {
        let params = CarFinanceParameters {
            vehicle_price: 12_000.0,
            deposit: 0.0,
            annual_rate_pct: 0.0,
            term_months: 24,
            balloon_payment: 0.0,
        };
        let result = calculate_car_finance(&params).expect("valid");
        assert_approx_tol(result.monthly_payment, 500.0, 1e-9);
        assert_approx_tol(result.total_interest, 0.0, 1e-9);
        assert_eq!(result.schedule.len(), 24);
        assert_approx_tol(result.schedule[23].balance, 0.0, 1e-9);
    }

    #[test]
    fn balloon_lowers_monthly_payment_and_is_due_at_the_end() {
        let hp = calculate_car_finance(&CarFinanceParameters::default()).expect("valid");
        let pcp = calculate_car_finance(&CarFinanceParameters {
            balloon_payment: 8_000.0,
            ..CarFinanceParameters::default()
        })
        .expect("valid");

        assert!(pcp.monthly_payment < hp.monthly_payment);
        assert!(pcp.total_interest > hp.total_interest);

        let before_last = &pcp.schedule[pcp.schedule.len() - 2];
        assert!(before_last.balance > 8_000.0);
        let last = pcp.schedule.last().expect("schedule");
        assert_approx_tol(last.payment, pcp.monthly_payment + 8_000.0, 1e-6);
        assert_approx_tol(last.balance, 0.0, 1e-9);
    }

    #[test]
    fn balloon_at_or_above_amount_financed_is_rejected() {
        let err = calculate_car_finance(&CarFinanceParameters {
            balloon_payment: 18_000.0,
            ..CarFinanceParameters::default()
        })
        .expect_err("must reject");
        assert_eq!(err.field(), Some("balloon payment"));
    }

    #[test]
    fn term_beyond_one_hundred_years_is_rejected() {
        for term_months in [MAX_TERM_PERIODS + 1, 3_000_000_000] {
            let err = calculate_car_finance(&CarFinanceParameters {
                term_months,
                ..CarFinanceParameters::default()
            })
            .expect_err("must reject");
            assert_eq!(err.field(), Some("term"));
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_payments_and_balloon_repay_amount_financed(
            price in 5_000u32..80_000,
            deposit_pct in 0u32..50,
            balloon_pct in 0u32..60,
            rate_bp in 0u32..1_500,
            term in 6u32..72
        ) {
            let price = price as f64;
            let deposit = price * deposit_pct as f64 / 100.0;
            let financed = price - deposit;
            let params = CarFinanceParameters {
                vehicle_price: price,
                deposit,
                annual_rate_pct: rate_bp as f64 / 100.0,
                term_months: term,
                balloon_payment: financed * balloon_pct as f64 / 100.0,
            };
            let result = calculate_car_finance(&params).unwrap();
            let principal: f64 = result.schedule.iter().map(|e| e.principal).sum();
            prop_assert!((principal - financed).abs() <= 1e-6 * financed);
            prop_assert!(result.total_interest >= -1e-6);
        }
    }
}
