use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: u32 = 12;

// Upper bounds on loop lengths and schedule sizes.
pub const MAX_TERM_PERIODS: u32 = 1_200;
pub const MAX_TERM_YEARS: u32 = MAX_TERM_PERIODS / MONTHS_PER_YEAR;
pub const MAX_AGE_SPAN: u32 = 150;
pub const MAX_COMPOUND_YEARS: u32 = 200;
pub const MAX_SOLVER_ITERATIONS: u32 = 1_000;
pub const MAX_INFLATION_SPAN_YEARS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanParameters {
    pub principal: f64,
    pub annual_rate_pct: f64,
    pub term_periods: u32,
    pub periods_per_year: u32,
    pub overpayment: f64,
}

impl Default for LoanParameters {
    fn default() -> Self {
        Self {
            principal: 225_000.0,
            annual_rate_pct: 4.5,
            term_periods: 300,
            periods_per_year: MONTHS_PER_YEAR,
            overpayment: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationScheduleEntry {
    pub period: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverpaymentOutcome {
    pub total_interest: f64,
    pub periods: u32,
    pub remaining_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: u32,
    pub payments: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSensitivity {
    pub base_rate_pct: f64,
    pub base_payment: f64,
    pub lower_rate_pct: f64,
    pub lower_payment: f64,
    pub higher_rate_pct: f64,
    pub higher_payment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MortgageParameters {
    pub property_price: f64,
    pub deposit: f64,
    pub annual_rate_pct: f64,
    pub term_years: u32,
    pub monthly_overpayment: f64,
    pub include_schedule: bool,
}

impl Default for MortgageParameters {
    fn default() -> Self {
        Self {
            property_price: 250_000.0,
            deposit: 25_000.0,
            annual_rate_pct: 4.5,
            term_years: 25,
            monthly_overpayment: 0.0,
            include_schedule: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverpaymentSavings {
    pub monthly_overpayment: f64,
    pub months_to_payoff: u32,
    pub months_saved: u32,
    pub total_interest: f64,
    pub interest_saved: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageResult {
    pub loan_amount: f64,
    pub loan_to_value_pct: f64,
    pub term_months: u32,
    pub monthly_payment: f64,
    pub total_repaid: f64,
    pub total_interest: f64,
    pub sensitivity: RateSensitivity,
    pub overpayment: Option<OverpaymentSavings>,
    pub yearly_schedule: Vec<YearSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CarFinanceParameters {
    pub vehicle_price: f64,
    pub deposit: f64,
    pub annual_rate_pct: f64,
    pub term_months: u32,
    pub balloon_payment: f64,
}

impl Default for CarFinanceParameters {
    fn default() -> Self {
        Self {
            vehicle_price: 20_000.0,
            deposit: 2_000.0,
            annual_rate_pct: 7.9,
            term_months: 48,
            balloon_payment: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarFinanceResult {
    pub amount_financed: f64,
    pub monthly_payment: f64,
    pub balloon_payment: f64,
    pub total_payable: f64,
    pub total_interest: f64,
    pub schedule: Vec<AmortizationScheduleEntry>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributionFrequency {
    Weekly,
    #[default]
    Monthly,
    Annually,
}

impl ContributionFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            ContributionFrequency::Weekly => 52,
            ContributionFrequency::Monthly => 12,
            ContributionFrequency::Annually => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAllocation {
    pub name: String,
    pub allocation_pct: f64,
    pub annual_return_pct: f64,
}

impl AssetAllocation {
    pub fn new(name: &str, allocation_pct: f64, annual_return_pct: f64) -> Self {
        Self {
            name: name.to_string(),
            allocation_pct,
            annual_return_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionParameters {
    pub starting_balance: f64,
    pub own_contribution: f64,
    pub employer_contribution: f64,
    pub contribution_frequency: ContributionFrequency,
    pub allocations: Vec<AssetAllocation>,
    pub inflation_rate_pct: f64,
    pub start_age: u32,
    pub end_age: u32,
    pub withdrawal_rate_pct: f64,
}

impl Default for ProjectionParameters {
    fn default() -> Self {
        Self {
            starting_balance: 10_000.0,
            own_contribution: 200.0,
            employer_contribution: 150.0,
            contribution_frequency: ContributionFrequency::Monthly,
            allocations: vec![
                AssetAllocation::new("equities", 70.0, 7.0),
                AssetAllocation::new("bonds", 20.0, 3.0),
                AssetAllocation::new("cash", 10.0, 1.5),
            ],
            inflation_rate_pct: 2.5,
            start_age: 30,
            end_age: 67,
            withdrawal_rate_pct: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionYearEntry {
    pub year: u32,
    pub age: u32,
    pub nominal_balance: f64,
    pub real_balance: f64,
    pub own_contribution: f64,
    pub employer_contribution: f64,
    pub growth: f64,
    pub asset_values: Vec<AssetValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub blended_return_pct: f64,
    pub final_nominal: f64,
    pub final_real: f64,
    pub total_own_contributions: f64,
    pub total_employer_contributions: f64,
    pub total_growth: f64,
    pub sustainable_income_nominal: f64,
    pub sustainable_income_real: f64,
    pub years: Vec<ProjectionYearEntry>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompoundingFrequency {
    #[default]
    Annually,
    Quarterly,
    Monthly,
    Daily,
}

impl CompoundingFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Annually => 1,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Daily => 365,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompoundParameters {
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    pub annual_rate_pct: f64,
    pub years: u32,
    pub compounding: CompoundingFrequency,
    pub inflation_rate_pct: f64,
}

impl Default for CompoundParameters {
    fn default() -> Self {
        Self {
            initial_amount: 5_000.0,
            monthly_contribution: 100.0,
            annual_rate_pct: 5.0,
            years: 10,
            compounding: CompoundingFrequency::Monthly,
            inflation_rate_pct: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundYearEntry {
    pub year: u32,
    pub balance: f64,
    pub real_balance: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub interest_this_year: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundResult {
    pub final_balance: f64,
    pub final_real_balance: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub years: Vec<CompoundYearEntry>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustDirection {
    #[default]
    Grow,
    Deflate,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InflationParameters {
    pub amount: f64,
    pub start_year: i32,
    pub end_year: i32,
    pub direction: AdjustDirection,
}

impl Default for InflationParameters {
    fn default() -> Self {
        Self {
            amount: 1_000.0,
            start_year: 2000,
            end_year: 2024,
            direction: AdjustDirection::Grow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationYearEntry {
    pub year: i32,
    pub amount: f64,
    pub rate_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationResult {
    pub original_amount: f64,
    pub adjusted_amount: f64,
    pub percentage_change: f64,
    pub average_annual_rate_pct: f64,
    pub years: Vec<InflationYearEntry>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StudentLoanPlan {
    #[default]
    None,
    Plan1,
    Plan2,
    Plan4,
    Plan5,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UkTaxBands {
    pub personal_allowance: f64,
    pub allowance_taper_start: f64,
    pub basic_rate_limit: f64,
    pub higher_rate_limit: f64,
    pub basic_rate_pct: f64,
    pub higher_rate_pct: f64,
    pub additional_rate_pct: f64,
    pub ni_primary_threshold: f64,
    pub ni_upper_earnings_limit: f64,
    pub ni_main_rate_pct: f64,
    pub ni_additional_rate_pct: f64,
}

impl Default for UkTaxBands {
    fn default() -> Self {
        // 2024/25, England
        Self {
            personal_allowance: 12_570.0,
            allowance_taper_start: 100_000.0,
            basic_rate_limit: 50_270.0,
            higher_rate_limit: 125_140.0,
            basic_rate_pct: 20.0,
            higher_rate_pct: 40.0,
            additional_rate_pct: 45.0,
            ni_primary_threshold: 12_570.0,
            ni_upper_earnings_limit: 50_270.0,
            ni_main_rate_pct: 8.0,
            ni_additional_rate_pct: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TakeHomeParameters {
    pub gross_salary: f64,
    pub pension_contribution_pct: f64,
    pub student_loan: StudentLoanPlan,
    pub postgraduate_loan: bool,
    pub bands: UkTaxBands,
}

impl Default for TakeHomeParameters {
    fn default() -> Self {
        Self {
            gross_salary: 30_000.0,
            pension_contribution_pct: 0.0,
            student_loan: StudentLoanPlan::None,
            postgraduate_loan: false,
            bands: UkTaxBands::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayBreakdown {
    pub gross: f64,
    pub pension: f64,
    pub income_tax: f64,
    pub national_insurance: f64,
    pub student_loan: f64,
    pub net: f64,
}

impl PayBreakdown {
    pub fn scaled(self, divisor: f64) -> Self {
        Self {
            gross: self.gross / divisor,
            pension: self.pension / divisor,
            income_tax: self.income_tax / divisor,
            national_insurance: self.national_insurance / divisor,
            student_loan: self.student_loan / divisor,
            net: self.net / divisor,
        }
    }

    pub fn total_deductions(self) -> f64 {
        self.pension + self.income_tax + self.national_insurance + self.student_loan
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeHomeResult {
    pub personal_allowance: f64,
    pub taxable_income: f64,
    pub effective_tax_rate_pct: f64,
    pub marginal_rate_pct: f64,
    pub annual: PayBreakdown,
    pub monthly: PayBreakdown,
    pub weekly: PayBreakdown,
}
