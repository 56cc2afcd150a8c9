use serde::{Deserialize, Serialize};

use super::amortization::{periodic_payment, periodic_rate, simulate_overpayment};
use super::error::{
    CalcError, CalcResult, require_at_most, require_non_negative, require_positive,
};
use super::mortgage::{term_months, validate_mortgage};
use super::projection::project_growth;
use super::types::{
    MAX_SOLVER_ITERATIONS, MONTHS_PER_YEAR, MortgageParameters, ProjectionParameters,
};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoalSolveConfig {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for GoalSolveConfig {
    fn default() -> Self {
        Self {
            search_min: 0.0,
            search_max: 10_000.0,
            tolerance: 0.01,
            max_iterations: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub achieved: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveResult {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_value: Option<f64>,
    pub achieved: Option<f64>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// Smallest monthly overpayment that clears the mortgage within `target_months`.
/// `achieved` is the number of months the solved overpayment takes.
pub fn solve_overpayment_for_term(
    mortgage: &MortgageParameters,
    target_months: u32,
    config: GoalSolveConfig,
) -> CalcResult<GoalSolveResult> {
    validate_config(config)?;
    validate_mortgage(mortgage)?;
    if target_months == 0 {
        return Err(CalcError::invalid("target months", "must be > 0"));
    }

    let loan_amount = mortgage.property_price - mortgage.deposit;
    let term_months = term_months(mortgage.term_years)?;
    let rate = periodic_rate(mortgage.annual_rate_pct, MONTHS_PER_YEAR);
    let payment = periodic_payment(loan_amount, rate, term_months)?;

    let months_for = |overpayment: f64| -> CalcResult<f64> {
        let outcome = simulate_overpayment(loan_amount, rate, payment, overpayment, term_months)?;
        Ok(outcome.periods as f64)
    };

    bisect_minimum(
        config,
        months_for,
        |months| months <= target_months as f64,
        "overpayment",
    )
}

/// Smallest own contribution per period that grows the pot to `target_pot` by the end age.
/// `achieved` is the projected nominal pot at the solved contribution.
pub fn solve_contribution_for_target(
    projection: &ProjectionParameters,
    target_pot: f64,
    config: GoalSolveConfig,
) -> CalcResult<GoalSolveResult> {
    validate_config(config)?;
    require_positive("target pot", target_pot)?;

    let pot_for = |own_contribution: f64| -> CalcResult<f64> {
        let params = ProjectionParameters {
            own_contribution,
            ..projection.clone()
        };
        Ok(project_growth(&params)?.final_nominal)
    };

    bisect_minimum(config, pot_for, |pot| pot >= target_pot, "contribution")
}

// `meets` must be monotone in the candidate: once a value satisfies the goal,
// every larger value does too.
fn bisect_minimum(
    config: GoalSolveConfig,
    evaluate: impl Fn(f64) -> CalcResult<f64>,
    meets: impl Fn(f64) -> bool,
    goal: &str,
) -> CalcResult<GoalSolveResult> {
    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    if meets(evaluate(config.search_min)?) {
        solved_value = Some(config.search_min);
        converged = true;
        feasible = true;
        message = format!("Already meets target at lower {goal} bound.");
    } else if !meets(evaluate(config.search_max)?) {
        feasible = false;
        message = format!("No feasible {goal} found within the search bounds.");
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let achieved = evaluate(mid)?;
            iterations.push(GoalSolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_value: mid,
                achieved,
            });

            if meets(achieved) {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved_value = Some(hi);
        feasible = true;
        message = if converged {
            format!("Solved required {goal}.")
        } else {
            "Reached max iterations before tolerance was met; returning best estimate.".to_string()
        };
    }

    let achieved = solved_value.map(&evaluate).transpose()?;

    tracing::debug!(
        goal,
        ?solved_value,
        iterations = iterations.len(),
        converged,
        feasible,
        "goal solver finished"
    );

    Ok(GoalSolveResult {
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_value,
        achieved,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn validate_config(config: GoalSolveConfig) -> CalcResult<()> {
    require_non_negative("search min", config.search_min)?;
    require_non_negative("search max", config.search_max)?;
    if config.search_max <= config.search_min {
        return Err(CalcError::invalid(
            "search max",
            "must be greater than search min",
        ));
    }
    require_positive("tolerance", config.tolerance)?;
    if config.max_iterations == 0 {
        return Err(CalcError::invalid("max iterations", "must be > 0"));
    }
    require_at_most("max iterations", config.max_iterations, MAX_SOLVER_ITERATIONS)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AssetAllocation, ContributionFrequency};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn interest_free_mortgage() -> MortgageParameters {
        // 120k over ten years at 0% is 1000 a month.
        MortgageParameters {
            property_price: 150_000.0,
            deposit: 30_000.0,
            annual_rate_pct: 0.0,
            term_years: 10,
            ..MortgageParameters::default()
        }
    }

    fn flat_projection() -> ProjectionParameters {
        ProjectionParameters {
            starting_balance: 1_000.0,
            own_contribution: 0.0,
            employer_contribution: 0.0,
            contribution_frequency: ContributionFrequency::Monthly,
            allocations: vec![AssetAllocation::new("cash", 100.0, 0.0)],
            inflation_rate_pct: 0.0,
            start_age: 30,
            end_age: 40,
            withdrawal_rate_pct: 4.0,
        }
    }

    #[test]
    fn overpayment_solver_halves_the_term() {
        let config = GoalSolveConfig {
            search_max: 5_000.0,
            ..GoalSolveConfig::default()
        };
        let result =
            solve_overpayment_for_term(&interest_free_mortgage(), 60, config).expect("must solve");
        assert!(result.feasible);
        assert!(result.converged);
        assert_close(
            result.solved_value.expect("value expected"),
            1_000.0,
            config.tolerance * 2.0,
        );
        assert!(result.achieved.expect("months expected") <= 60.0);
        assert!(!result.iterations.is_empty());
    }

    #[test]
    fn overpayment_solver_needs_nothing_when_target_is_the_full_term() {
        let result =
            solve_overpayment_for_term(&interest_free_mortgage(), 120, GoalSolveConfig::default())
                .expect("must solve");
        assert!(result.feasible);
        assert_eq!(result.solved_value, Some(0.0));
        assert!(result.iterations.is_empty());
    }

    #[test]
    fn overpayment_solver_reports_infeasible_when_bounds_too_low() {
        let config = GoalSolveConfig {
            search_max: 100.0,
            ..GoalSolveConfig::default()
        };
        let result =
            solve_overpayment_for_term(&interest_free_mortgage(), 12, config).expect("must return");
        assert!(!result.feasible);
        assert!(result.solved_value.is_none());
        assert!(result.achieved.is_none());
    }

    #[test]
    fn contribution_solver_finds_deterministic_solution() {
        // 1000 + 120 months * 200 = 25000
        let config = GoalSolveConfig {
            search_max: 1_000.0,
            ..GoalSolveConfig::default()
        };
        let result =
            solve_contribution_for_target(&flat_projection(), 25_000.0, config).expect("must solve");
        assert!(result.feasible);
        assert_close(
            result.solved_value.expect("value expected"),
            200.0,
            config.tolerance * 2.0,
        );
        assert!(result.achieved.expect("pot expected") >= 25_000.0);
    }

    #[test]
    fn iteration_bounds_narrow_monotonically() {
        let result = solve_contribution_for_target(
            &flat_projection(),
            25_000.0,
            GoalSolveConfig::default(),
        )
        .expect("must solve");
        for pair in result.iterations.windows(2) {
            assert!(pair[1].lower_bound >= pair[0].lower_bound);
            assert!(pair[1].upper_bound <= pair[0].upper_bound);
        }
    }

    #[test]
    fn max_iterations_cap_returns_best_estimate() {
        let config = GoalSolveConfig {
            max_iterations: 3,
            tolerance: 1e-9,
            ..GoalSolveConfig::default()
        };
        let result =
            solve_contribution_for_target(&flat_projection(), 25_000.0, config).expect("must solve");
        assert!(result.feasible);
        assert!(!result.converged);
        assert_eq!(result.iterations.len(), 3);
        assert!(result.solved_value.expect("value expected") >= 200.0);
    }

    #[test]
    fn inverted_search_bounds_are_rejected() {
        let config = GoalSolveConfig {
            search_min: 500.0,
            search_max: 100.0,
            ..GoalSolveConfig::default()
        };
        let err = solve_contribution_for_target(&flat_projection(), 25_000.0, config)
            .expect_err("must reject");
        assert_eq!(err.field(), Some("search max"));
    }

    #[test]
    fn oversized_term_and_iteration_count_are_rejected() {
        let mortgage = MortgageParameters {
            term_years: 400_000_000,
            ..interest_free_mortgage()
        };
        let err = solve_overpayment_for_term(&mortgage, 60, GoalSolveConfig::default())
            .expect_err("must reject");
        assert_eq!(err.field(), Some("term"));

        let config = GoalSolveConfig {
            max_iterations: u32::MAX,
            ..GoalSolveConfig::default()
        };
        let err = solve_contribution_for_target(&flat_projection(), 25_000.0, config)
            .expect_err("must reject");
        assert_eq!(err.field(), Some("max iterations"));
    }

    #[test]
    fn zero_tolerance_is_rejected() {
        let config = GoalSolveConfig {
            tolerance: 0.0,
            ..GoalSolveConfig::default()
        };
        let err = solve_overpayment_for_term(&interest_free_mortgage(), 60, config)
            .expect_err("must reject");
        assert_eq!(err.field(), Some("tolerance"));
    }
}
