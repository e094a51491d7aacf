use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Purchase and assessment facts for one depreciation calculation.
/// Built per request; never persisted by the engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DepreciationInput {
    pub purchase_price: f64,
    pub purchase_date: NaiveDate,
    pub assessed_land_value: f64,
    pub assessed_building_value: f64,
}

/// Headline depreciation figures for a property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationResult {
    pub land_value: f64,
    pub building_value: f64,
    pub depreciable_value: f64,
    pub annual_depreciation: f64,
    /// Months of service in the purchase year under the mid-month convention.
    pub months_in_first_year: f64,
    pub first_year_depreciation: f64,
}

/// One row of the year-by-year schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationScheduleEntry {
    /// 1-based position in the schedule.
    pub year: u32,
    /// Calendar tax year the entry applies to.
    pub tax_year: i32,
    pub depreciation: f64,
    pub accumulated: f64,
    pub remaining_value: f64,
}
