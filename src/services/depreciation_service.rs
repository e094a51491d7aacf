use chrono::{Datelike, Utc};

use crate::errors::AppError;
use crate::models::{DepreciationInput, DepreciationResult, DepreciationScheduleEntry};
use crate::utils::round_money;

/// Recovery period for residential rental buildings (MACRS straight-line).
pub const RECOVERY_PERIOD_YEARS: f64 = 27.5;

/// Marginal tax rate assumed when the caller does not supply one.
pub const DEFAULT_MARGINAL_TAX_RATE: f64 = 0.24;

/// Compute the headline depreciation figures for a purchase.
///
/// The land/building split is a *ratio* taken from the assessed values and
/// applied to the purchase price, not to the assessed values themselves.
/// That economic-allocation assumption is intentional and relied on by
/// downstream consumers.
pub fn calculate_depreciation(input: &DepreciationInput) -> Result<DepreciationResult, AppError> {
    if input.purchase_price <= 0.0 {
        return Err(AppError::Validation(
            "purchase price must be positive".to_string(),
        ));
    }
    if input.assessed_building_value <= 0.0 {
        return Err(AppError::Validation(
            "assessed building value must be positive".to_string(),
        ));
    }
    if input.purchase_date > Utc::now().date_naive() {
        return Err(AppError::Validation(
            "purchase date cannot be in the future".to_string(),
        ));
    }

    let total_assessed = input.assessed_land_value + input.assessed_building_value;
    if total_assessed <= 0.0 {
        return Err(AppError::Validation(
            "combined assessed value must be positive".to_string(),
        ));
    }

    let land_ratio = input.assessed_land_value / total_assessed;
    let land_value = input.purchase_price * land_ratio;
    let building_value = input.purchase_price - land_value;
    let depreciable_value = building_value;

    let annual_depreciation = depreciable_value / RECOVERY_PERIOD_YEARS;

    // Mid-month convention: the building is treated as placed in service at
    // the midpoint of the purchase month.
    let months_in_first_year = 12.0 - input.purchase_date.month0() as f64 - 0.5;
    let first_year_depreciation = annual_depreciation / 12.0 * months_in_first_year;

    Ok(DepreciationResult {
        land_value: round_money(land_value),
        building_value: round_money(building_value),
        depreciable_value: round_money(depreciable_value),
        annual_depreciation: round_money(annual_depreciation),
        months_in_first_year,
        first_year_depreciation: round_money(first_year_depreciation),
    })
}

/// Year-by-year schedule starting at the purchase's calendar year.
///
/// The final entry absorbs accumulated rounding so the schedule always sums
/// to the depreciable value exactly and ends with a remaining value of zero.
pub fn generate_depreciation_schedule(
    input: &DepreciationInput,
) -> Result<Vec<DepreciationScheduleEntry>, AppError> {
    let result = calculate_depreciation(input)?;
    let depreciable = result.depreciable_value;
    let max_entries = RECOVERY_PERIOD_YEARS.ceil() as u32 + 1;
    let start_year = input.purchase_date.year();

    let mut entries = Vec::with_capacity(max_entries as usize);
    let mut accumulated = 0.0;

    for year in 1..=max_entries {
        let remaining_before = round_money(depreciable - accumulated);
        if remaining_before <= 0.01 {
            break;
        }

        let nominal = if year == 1 {
            result.first_year_depreciation
        } else {
            result.annual_depreciation
        };
        // Plug the last year so the schedule fully amortizes.
        let depreciation = if nominal + 0.01 >= remaining_before || year == max_entries {
            remaining_before
        } else {
            nominal
        };

        accumulated = round_money(accumulated + depreciation);
        entries.push(DepreciationScheduleEntry {
            year,
            tax_year: start_year + (year as i32 - 1),
            depreciation,
            accumulated,
            remaining_value: round_money(depreciable - accumulated),
        });
    }

    Ok(entries)
}

/// Depreciation claimable in a given tax year; 0 for years outside the
/// schedule.
pub fn get_current_year_depreciation(
    input: &DepreciationInput,
    tax_year: i32,
) -> Result<f64, AppError> {
    let schedule = generate_depreciation_schedule(input)?;
    Ok(schedule
        .iter()
        .find(|entry| entry.tax_year == tax_year)
        .map(|entry| entry.depreciation)
        .unwrap_or(0.0))
}

/// Depreciation accumulated through a given tax year; 0 for years outside
/// the schedule.
pub fn get_accumulated_depreciation(
    input: &DepreciationInput,
    tax_year: i32,
) -> Result<f64, AppError> {
    let schedule = generate_depreciation_schedule(input)?;
    Ok(schedule
        .iter()
        .find(|entry| entry.tax_year == tax_year)
        .map(|entry| entry.accumulated)
        .unwrap_or(0.0))
}

/// Annual tax saving implied by a depreciation deduction.
pub fn estimate_tax_savings(annual_depreciation: f64, marginal_rate: Option<f64>) -> f64 {
    let rate = marginal_rate.unwrap_or(DEFAULT_MARGINAL_TAX_RATE);
    round_money(annual_depreciation * rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn input(date: &str) -> DepreciationInput {
        DepreciationInput {
            purchase_price: 500_000.0,
            purchase_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            assessed_land_value: 100_000.0,
            assessed_building_value: 400_000.0,
        }
    }

    #[test]
    fn january_purchase_documented_values() {
        let result = calculate_depreciation(&input("2024-01-15")).unwrap();
        assert_eq!(result.building_value, 400_000.0);
        assert_eq!(result.annual_depreciation, 14_545.45);
        assert_eq!(result.months_in_first_year, 11.5);
        assert_eq!(result.first_year_depreciation, 13_939.39);
    }

    #[test]
    fn december_purchase_gets_half_month() {
        let result = calculate_depreciation(&input("2024-12-15")).unwrap();
        assert_eq!(result.months_in_first_year, 0.5);
        assert!((result.first_year_depreciation - 606.06).abs() < 0.01);
    }

    #[test]
    fn ratio_is_applied_to_purchase_price() {
        // Assessed values half the purchase price: the 20/80 split still
        // allocates against the full 500k.
        let result = calculate_depreciation(&DepreciationInput {
            purchase_price: 500_000.0,
            purchase_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            assessed_land_value: 50_000.0,
            assessed_building_value: 200_000.0,
        })
        .unwrap();
        assert_eq!(result.land_value, 100_000.0);
        assert_eq!(result.building_value, 400_000.0);
    }

    #[test]
    fn schedule_fully_amortizes() {
        for date in ["2024-01-15", "2024-12-15", "2019-07-04"] {
            let schedule = generate_depreciation_schedule(&input(date)).unwrap();
            let total: f64 = schedule.iter().map(|e| e.depreciation).sum();
            assert!((total - 400_000.0).abs() <= 0.01, "sum drifted for {date}");
            assert_eq!(schedule.last().unwrap().remaining_value, 0.0);
            assert!(schedule.len() <= 29);
        }
    }

    #[test]
    fn schedule_years_are_sequential_from_purchase() {
        let schedule = generate_depreciation_schedule(&input("2024-01-15")).unwrap();
        assert_eq!(schedule[0].tax_year, 2024);
        assert_eq!(schedule[0].depreciation, 13_939.39);
        assert_eq!(schedule[1].tax_year, 2025);
        assert_eq!(schedule[1].depreciation, 14_545.45);
    }

    #[test]
    fn year_lookups() {
        let i = input("2024-01-15");
        assert_eq!(get_current_year_depreciation(&i, 2023).unwrap(), 0.0);
        assert_eq!(get_current_year_depreciation(&i, 2025).unwrap(), 14_545.45);
        assert_eq!(get_accumulated_depreciation(&i, 2023).unwrap(), 0.0);
        assert_eq!(
            get_accumulated_depreciation(&i, 2025).unwrap(),
            round_money(13_939.39 + 14_545.45)
        );
    }

    #[test]
    fn rejects_invalid_inputs() {
        let mut bad = input("2024-01-15");
        bad.purchase_price = 0.0;
        assert!(matches!(
            calculate_depreciation(&bad),
            Err(AppError::Validation(_))
        ));

        let mut bad = input("2024-01-15");
        bad.assessed_building_value = 0.0;
        assert!(matches!(
            calculate_depreciation(&bad),
            Err(AppError::Validation(_))
        ));

        let mut bad = input("2024-01-15");
        bad.purchase_date = Utc::now().date_naive() + chrono::Duration::days(30);
        assert!(matches!(
            calculate_depreciation(&bad),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn tax_savings_uses_default_rate() {
        assert_eq!(estimate_tax_savings(14_545.45, None), 3_490.91);
        assert_eq!(estimate_tax_savings(10_000.0, Some(0.32)), 3_200.0);
    }
}
