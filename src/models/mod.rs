mod depreciation;
mod market;
mod optimization;
mod property;
mod refinancing;
mod valuation;

pub use depreciation::{DepreciationInput, DepreciationResult, DepreciationScheduleEntry};
pub use market::{
    ComparableProperty, Confidence, MarketAnalysis, MarketInsight, MarketPosition, MarketQuery,
    InsightKind, RentTrendPoint,
};
pub use optimization::{
    Concession, ConcessionKind, OptimizationRecord, OptimizationStatus, OptimizePriceInput,
    PricingRecommendation,
};
pub use property::{Property, PropertyFinancials, Tenant};
pub use refinancing::{LoanDetails, MarketRates, RefinancingOpportunity};
pub use valuation::{
    Appreciation, ProjectionAssumptions, ProjectionYear, PropertyValuation, SaleScenario,
    ValuationConfidence, ValuationReport, YearlyNoi,
};
