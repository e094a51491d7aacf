use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The borrower's existing loan, as known to the caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoanDetails {
    pub principal_balance: f64,
    /// Annual interest rate, percent.
    pub interest_rate: f64,
    pub term_length_months: u32,
    pub monthly_payment: f64,
    pub remaining_months: Option<u32>,
    pub origination_date: Option<NaiveDate>,
    pub property_value: Option<f64>,
    pub prepayment_penalty: Option<f64>,
}

/// Published average rates by loan category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRates {
    pub conventional_30: f64,
    pub conventional_20: f64,
    pub conventional_15: f64,
    pub fha: f64,
    pub va: f64,
    pub jumbo: f64,
    pub commercial: f64,
    pub last_updated: DateTime<Utc>,
}

/// Result of one refinancing analysis. Computed fresh per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinancingOpportunity {
    pub should_refinance: bool,
    pub current_rate: f64,
    pub market_rate: f64,
    pub rate_difference: f64,
    pub current_monthly_payment: f64,
    pub new_monthly_payment: f64,
    pub monthly_savings: f64,
    pub closing_costs: f64,
    /// `None` when monthly savings are zero or negative (never breaks even).
    pub break_even_months: Option<u32>,
    pub npv: f64,
    pub total_interest_current: f64,
    pub total_interest_new: f64,
    pub total_interest_savings: f64,
    /// Interest savings over the loan life net of closing costs.
    pub lifetime_savings: f64,
    /// Market rate with closing costs amortized over the new term,
    /// as a percent of principal per year.
    pub effective_rate: f64,
    pub remaining_months: u32,
    pub new_term_months: u32,
    pub loan_to_value: Option<f64>,
    pub recommendation: String,
    pub reasoning: Vec<String>,
    pub risk_factors: Vec<String>,
}
