use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::market::{Confidence, MarketInsight, MarketPosition};

/// Non-price incentive offered to fill vacancy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConcessionKind {
    FirstMonthDiscount,
    ReducedDeposit,
    AmenityUpgrade,
    FlexibleTerms,
}

impl ConcessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConcessionKind::FirstMonthDiscount => "first_month_discount",
            ConcessionKind::ReducedDeposit => "reduced_deposit",
            ConcessionKind::AmenityUpgrade => "amenity_upgrade",
            ConcessionKind::FlexibleTerms => "flexible_terms",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concession {
    pub kind: ConcessionKind,
    pub description: String,
}

/// Lifecycle of a persisted optimization. `pending` is the only state that
/// accepts a transition; `approved` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationStatus {
    Pending,
    Approved,
    Rejected,
}

impl OptimizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationStatus::Pending => "pending",
            OptimizationStatus::Approved => "approved",
            OptimizationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OptimizationStatus::Pending),
            "approved" => Some(OptimizationStatus::Approved),
            "rejected" => Some(OptimizationStatus::Rejected),
            _ => None,
        }
    }
}

/// Pricing advice for one unit, as produced by market intelligence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRecommendation {
    pub recommended_rent: f64,
    pub current_rent: f64,
    pub change_amount: f64,
    pub change_percent: f64,
    pub confidence: Confidence,
    pub market_position: MarketPosition,
    pub reasoning: Vec<String>,
    pub insights: Vec<MarketInsight>,
}

/// Request to optimize one unit's rent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OptimizePriceInput {
    pub property_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub zip_code: String,
    pub current_rent: f64,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub square_feet: f64,
    /// Percent of units occupied. When absent the pricing policy falls back
    /// to its hold behavior and confidence loses a point.
    pub occupancy_rate: Option<f64>,
}

/// Persisted outcome of `optimize_price`, awaiting review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationRecord {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub zip_code: String,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub square_feet: f64,
    pub occupancy_rate: Option<f64>,
    pub current_rent: f64,
    pub recommended_rent: f64,
    pub change_amount: f64,
    pub change_percent: f64,
    pub market_position: MarketPosition,
    pub confidence: Confidence,
    pub reasoning: Vec<String>,
    pub insights: Vec<String>,
    pub should_offer_concession: bool,
    pub concessions: Vec<Concession>,
    pub status: OptimizationStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
