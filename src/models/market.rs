use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Confidence tier attached to analyses and recommendations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Confidence::Low),
            "MEDIUM" => Some(Confidence::Medium),
            "HIGH" => Some(Confidence::High),
            _ => None,
        }
    }
}

/// Where a unit's rent sits relative to its market.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarketPosition {
    AboveMarket,
    AtMarket,
    BelowMarket,
}

impl MarketPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketPosition::AboveMarket => "above_market",
            MarketPosition::AtMarket => "at_market",
            MarketPosition::BelowMarket => "below_market",
        }
    }

    pub fn from_str_or_at(s: &str) -> Self {
        match s {
            "above_market" => MarketPosition::AboveMarket,
            "below_market" => MarketPosition::BelowMarket,
            _ => MarketPosition::AtMarket,
        }
    }
}

/// Unit characteristics a market lookup is keyed on.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketQuery {
    pub zip_code: String,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub square_feet: f64,
    pub current_rent: Option<f64>,
}

/// A nearby, similar unit used as a pricing reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparableProperty {
    pub address: String,
    /// Distance from the subject unit, in miles.
    pub distance: f64,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub square_feet: f64,
    pub rent_amount: f64,
    pub listing_date: NaiveDate,
}

/// One point of the trailing rent trend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentTrendPoint {
    /// "YYYY-MM"
    pub month: String,
    pub median_rent: f64,
}

/// Snapshot of rental-market conditions for one zip code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub zip_code: String,
    pub median_rent: f64,
    /// Annualized rent growth, percent.
    pub growth_velocity: f64,
    pub rent_trend: Vec<RentTrendPoint>,
    pub comparables: Vec<ComparableProperty>,
    /// Percent of units vacant.
    pub vacancy_rate: f64,
    pub avg_days_on_market: f64,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Opportunity,
    Warning,
    Neutral,
}

/// A single threshold-derived observation about the market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketInsight {
    pub kind: InsightKind,
    pub message: String,
}
