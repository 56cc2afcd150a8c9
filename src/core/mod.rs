mod amortization;
mod car_finance;
mod compound;
mod error;
mod inflation;
mod mortgage;
mod projection;
mod solver;
mod take_home;
mod types;

pub use amortization::{
    amortization_schedule, loan_payment, periodic_payment, periodic_rate, rate_sensitivity,
    simulate_overpayment, summarize_by_year,
};
pub use car_finance::calculate_car_finance;
pub use compound::project_compound;
pub use error::{CalcError, CalcResult};
pub use inflation::{DEFAULT_FALLBACK_RATE_PCT, InflationSeries, adjust_for_inflation};
pub use mortgage::{SENSITIVITY_DELTA_PCT, calculate_mortgage};
pub use projection::{blended_return, project_growth, validate_allocations};
pub use solver::{
    GoalSolveConfig, GoalSolveIteration, GoalSolveResult, solve_contribution_for_target,
    solve_overpayment_for_term,
};
pub use take_home::{
    calculate_take_home, national_insurance, student_loan_repayment, uk_income_tax,
};
pub use types::{
    AdjustDirection, AmortizationScheduleEntry, AssetAllocation, AssetValue, CarFinanceParameters,
    CarFinanceResult, CompoundParameters, CompoundResult, CompoundYearEntry, CompoundingFrequency,
    ContributionFrequency, InflationParameters, InflationResult, InflationYearEntry,
    LoanParameters, MONTHS_PER_YEAR, MortgageParameters, MortgageResult, OverpaymentOutcome,
    OverpaymentSavings, PayBreakdown, ProjectionParameters, ProjectionResult, ProjectionYearEntry,
    RateSensitivity, StudentLoanPlan, TakeHomeParameters, TakeHomeResult, UkTaxBands, YearSummary,
};
