use serde::{Deserialize, Serialize};

/// Confidence in a cap-rate valuation, driven by how well the supplied cap
/// rate agrees with the rate implied by the purchase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValuationConfidence {
    Low,
    Medium,
    High,
}

/// Output of `calculate_valuation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationReport {
    pub estimated_value: f64,
    pub cap_rate: f64,
    pub implied_cap_rate: Option<f64>,
    pub total_appreciation: Option<f64>,
    /// Annualized appreciation (CAGR), percent.
    pub annual_appreciation_rate: Option<f64>,
    /// Total appreciation as a percent of the purchase price.
    pub total_return: Option<f64>,
    pub confidence: ValuationConfidence,
}

/// Value change since purchase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Appreciation {
    pub total_appreciation: f64,
    /// CAGR, percent. 0 when no time has elapsed.
    pub annual_rate: f64,
    /// Total appreciation as a percent of the purchase price.
    pub total_return: f64,
    pub years_held: f64,
}

/// Outcome of selling at a projected value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SaleScenario {
    pub projected_value: f64,
    pub selling_costs: f64,
    pub remaining_loan_balance: f64,
    pub net_proceeds: f64,
}

/// Growth assumptions for multi-year projections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectionAssumptions {
    pub years: u32,
    /// Annual value appreciation, percent.
    pub appreciation_rate: f64,
    /// Annual income growth, percent.
    pub income_growth: f64,
    /// Annual expense growth, percent.
    pub expense_growth: f64,
}

impl Default for ProjectionAssumptions {
    fn default() -> Self {
        Self {
            years: 5,
            appreciation_rate: 3.0,
            income_growth: 3.0,
            expense_growth: 2.5,
        }
    }
}

/// NOI for one projected year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyNoi {
    pub year: u32,
    pub income: f64,
    pub expenses: f64,
    pub noi: f64,
}

/// One year of a value/cash-flow projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: u32,
    pub value: f64,
    pub noi: f64,
    pub cash_flow: f64,
    /// Value gain over today plus cumulative cash flow to date.
    pub equity: f64,
}

/// Valuation + projections assembled for a stored property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyValuation {
    pub property_id: uuid::Uuid,
    pub annual_noi: f64,
    pub cap_rate: f64,
    pub report: ValuationReport,
    pub projections: Vec<ProjectionYear>,
}
