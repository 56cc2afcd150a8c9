use super::error::{CalcError, CalcResult, require_non_negative};
use super::types::{
    MONTHS_PER_YEAR, PayBreakdown, StudentLoanPlan, TakeHomeParameters, TakeHomeResult,
    UkTaxBands,
};

const WEEKS_PER_YEAR: f64 = 52.0;
const POSTGRADUATE_THRESHOLD: f64 = 21_000.0;
const POSTGRADUATE_RATE: f64 = 0.06;
const UNDERGRADUATE_RATE: f64 = 0.09;
// Step used to measure the marginal rate on the next pound earned.
const MARGINAL_STEP: f64 = 1.0;

impl StudentLoanPlan {
    pub fn threshold(self) -> Option<f64> {
        match self {
            StudentLoanPlan::None => None,
            StudentLoanPlan::Plan1 => Some(24_990.0),
            StudentLoanPlan::Plan2 => Some(27_295.0),
            StudentLoanPlan::Plan4 => Some(31_395.0),
            StudentLoanPlan::Plan5 => Some(25_000.0),
        }
    }
}

pub fn calculate_take_home(params: &TakeHomeParameters) -> CalcResult<TakeHomeResult> {
    require_non_negative("gross salary", params.gross_salary)?;
    if !(0.0..=100.0).contains(&params.pension_contribution_pct) {
        return Err(CalcError::invalid(
            "pension contribution",
            "must be between 0 and 100",
        ));
    }
    validate_bands(&params.bands)?;

    let annual = annual_breakdown(params.gross_salary, params);
    let bumped = annual_breakdown(params.gross_salary + MARGINAL_STEP, params);
    let statutory = |b: PayBreakdown| b.income_tax + b.national_insurance + b.student_loan;
    let marginal_rate_pct = (statutory(bumped) - statutory(annual)) / MARGINAL_STEP * 100.0;

    let adjusted_income = sacrificed_salary(params.gross_salary, params);
    let personal_allowance = tapered_allowance(adjusted_income, &params.bands);
    let effective_tax_rate_pct = if params.gross_salary > 0.0 {
        statutory(annual) / params.gross_salary * 100.0
    } else {
        0.0
    };

    Ok(TakeHomeResult {
        personal_allowance,
        taxable_income: (adjusted_income - personal_allowance).max(0.0),
        effective_tax_rate_pct,
        marginal_rate_pct,
        annual,
        monthly: annual.scaled(MONTHS_PER_YEAR as f64),
        weekly: annual.scaled(WEEKS_PER_YEAR),
    })
}

pub fn uk_income_tax(gross_income: f64, bands: &UkTaxBands) -> f64 {
    let gross = gross_income.max(0.0);
    let allowance = tapered_allowance(gross, bands);
    let taxable_income = (gross - allowance).max(0.0);

    // Band widths are fixed by the untapered allowance; losing allowance pulls
    // the higher rate down to a lower gross income rather than widening the basic band.
    let basic_band_width = (bands.basic_rate_limit - bands.personal_allowance).max(0.0);
    let higher_ceiling = bands.higher_rate_limit.max(basic_band_width);

    let basic_taxable = taxable_income.min(basic_band_width);
    let higher_taxable = (taxable_income.min(higher_ceiling) - basic_band_width).max(0.0);
    let additional_taxable = (taxable_income - higher_ceiling).max(0.0);

    basic_taxable * bands.basic_rate_pct / 100.0
        + higher_taxable * bands.higher_rate_pct / 100.0
        + additional_taxable * bands.additional_rate_pct / 100.0
}

pub fn national_insurance(gross_income: f64, bands: &UkTaxBands) -> f64 {
    let gross = gross_income.max(0.0);
    let main = (gross.min(bands.ni_upper_earnings_limit) - bands.ni_primary_threshold).max(0.0);
    let upper = (gross - bands.ni_upper_earnings_limit.max(bands.ni_primary_threshold)).max(0.0);
    main * bands.ni_main_rate_pct / 100.0 + upper * bands.ni_additional_rate_pct / 100.0
}

pub fn student_loan_repayment(gross_income: f64, plan: StudentLoanPlan, postgraduate: bool) -> f64 {
    let gross = gross_income.max(0.0);
    let undergraduate = plan
        .threshold()
        .map(|threshold| (gross - threshold).max(0.0) * UNDERGRADUATE_RATE)
        .unwrap_or(0.0);
    let postgraduate = if postgraduate {
        (gross - POSTGRADUATE_THRESHOLD).max(0.0) * POSTGRADUATE_RATE
    } else {
        0.0
    };
    undergraduate + postgraduate
}

fn tapered_allowance(gross: f64, bands: &UkTaxBands) -> f64 {
    let mut allowance = bands.personal_allowance.max(0.0);
    if gross > bands.allowance_taper_start {
        let reduction = (gross - bands.allowance_taper_start) / 2.0;
        allowance = (allowance - reduction).max(0.0);
    }
    allowance
}

fn sacrificed_salary(gross_salary: f64, params: &TakeHomeParameters) -> f64 {
    gross_salary * (1.0 - params.pension_contribution_pct / 100.0)
}

fn annual_breakdown(gross_salary: f64, params: &TakeHomeParameters) -> PayBreakdown {
    let pension = gross_salary * params.pension_contribution_pct / 100.0;
    let adjusted = sacrificed_salary(gross_salary, params);

    let income_tax = uk_income_tax(adjusted, &params.bands);
    let national_insurance = national_insurance(adjusted, &params.bands);
    let student_loan =
        student_loan_repayment(adjusted, params.student_loan, params.postgraduate_loan);

    PayBreakdown {
        gross: gross_salary,
        pension,
        income_tax,
        national_insurance,
        student_loan,
        net: gross_salary - pension - income_tax - national_insurance - student_loan,
    }
}

fn validate_bands(bands: &UkTaxBands) -> CalcResult<()> {
    for (field, value) in [
        ("personal allowance", bands.personal_allowance),
        ("allowance taper start", bands.allowance_taper_start),
        ("basic rate limit", bands.basic_rate_limit),
        ("higher rate limit", bands.higher_rate_limit),
        ("NI primary threshold", bands.ni_primary_threshold),
        ("NI upper earnings limit", bands.ni_upper_earnings_limit),
    ] {
        require_non_negative(field, value)?;
    }
    for (field, rate) in [
        ("basic rate", bands.basic_rate_pct),
        ("higher rate", bands.higher_rate_pct),
        ("additional rate", bands.additional_rate_pct),
        ("NI main rate", bands.ni_main_rate_pct),
        ("NI additional rate", bands.ni_additional_rate_pct),
    ] {
        if !(0.0..=100.0).contains(&rate) {
            return Err(CalcError::invalid(field, "must be between 0 and 100"));
        }
    }
    if bands.basic_rate_limit < bands.personal_allowance {
        return Err(CalcError::invalid(
            "basic rate limit",
            "must be >= personal allowance",
        ));
    }
    if bands.higher_rate_limit < bands.basic_rate_limit {
        return Err(CalcError::invalid(
            "higher rate limit",
            "must be >= basic rate limit",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn salary(gross_salary: f64) -> TakeHomeParameters {
        TakeHomeParameters {
            gross_salary,
            ..TakeHomeParameters::default()
        }
    }

    #[test]
    fn basic_rate_salary() {
        let result = calculate_take_home(&salary(30_000.0)).expect("valid");
        assert_approx(result.annual.income_tax, 3_486.0);
        assert_approx(result.annual.national_insurance, 1_394.4);
        assert_approx(result.annual.net, 25_119.6);
        assert_approx(result.monthly.net, 25_119.6 / 12.0);
        assert_approx(result.weekly.gross, 30_000.0 / 52.0);
        assert_approx(result.personal_allowance, 12_570.0);
        assert_approx(result.marginal_rate_pct, 28.0);
    }

    #[test]
    fn allowance_tapers_above_one_hundred_thousand() {
        let result = calculate_take_home(&salary(110_000.0)).expect("valid");
        assert_approx(result.personal_allowance, 7_570.0);
        assert_approx(result.taxable_income, 102_430.0);
        assert_approx(result.annual.income_tax, 7_540.0 + 25_892.0);
        assert_approx(result.annual.national_insurance, 3_016.0 + 1_194.6);
        // 40% band, 20% from the lost allowance, 2% NI
        assert_approx(result.marginal_rate_pct, 62.0);
    }

    #[test]
    fn additional_rate_applies_above_higher_limit() {
        let tax = uk_income_tax(150_000.0, &UkTaxBands::default());
        let expected = 37_700.0 * 0.20 + (125_140.0 - 37_700.0) * 0.40 + (150_000.0 - 125_140.0) * 0.45;
        assert_approx(tax, expected);
    }

    #[test]
    fn salary_sacrifice_reduces_tax_and_ni() {
        let params = TakeHomeParameters {
            pension_contribution_pct: 5.0,
            ..salary(30_000.0)
        };
        let result = calculate_take_home(&params).expect("valid");
        assert_approx(result.annual.pension, 1_500.0);
        assert_approx(result.annual.income_tax, 3_186.0);
        assert_approx(result.annual.national_insurance, 1_274.4);
        assert_approx(result.annual.net, 24_039.6);
    }

    #[test]
    fn student_loans_repay_above_threshold() {
        let params = TakeHomeParameters {
            student_loan: StudentLoanPlan::Plan2,
            postgraduate_loan: true,
            ..salary(30_000.0)
        };
        let result = calculate_take_home(&params).expect("valid");
        assert_approx(result.annual.student_loan, 243.45 + 540.0);
        assert_approx(
            result.annual.net,
            30_000.0 - result.annual.total_deductions(),
        );
    }

    #[test]
    fn income_below_allowance_pays_nothing() {
        let result = calculate_take_home(&salary(12_000.0)).expect("valid");
        assert_approx(result.annual.income_tax, 0.0);
        assert_approx(result.annual.national_insurance, 0.0);
        assert_approx(result.annual.net, 12_000.0);
        assert_approx(result.effective_tax_rate_pct, 0.0);
    }

    #[test]
    fn invalid_pension_percentage_is_rejected() {
        let params = TakeHomeParameters {
            pension_contribution_pct: 120.0,
            ..salary(30_000.0)
        };
        let err = calculate_take_home(&params).expect_err("must reject");
        assert_eq!(err.field(), Some("pension contribution"));
    }

    #[test]
    fn inverted_bands_are_rejected() {
        let mut params = salary(30_000.0);
        params.bands.basic_rate_limit = 10_000.0;
        let err = calculate_take_home(&params).expect_err("must reject");
        assert_eq!(err.field(), Some("basic rate limit"));
    }
}
