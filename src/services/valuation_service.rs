use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    Appreciation, ProjectionAssumptions, ProjectionYear, PropertyValuation, SaleScenario,
    ValuationConfidence, ValuationReport, YearlyNoi,
};
use crate::store::RecordStore;
use crate::utils::{round_money, round_to};

/// Share of the sale price lost to agent commissions and closing.
pub const DEFAULT_SELLING_COST_RATE: f64 = 0.06;

const MS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Income-approach value: NOI capitalized at the given rate.
pub fn calculate_property_value(annual_noi: f64, cap_rate_percent: f64) -> Result<f64, AppError> {
    if cap_rate_percent <= 0.0 {
        return Err(AppError::Validation(
            "cap rate must be positive".to_string(),
        ));
    }
    Ok(round_money(annual_noi / (cap_rate_percent / 100.0)))
}

/// Cap rate implied by what was actually paid. Returns 0 rather than
/// erroring on a non-positive price; callers treat that as "unknown".
pub fn calculate_implied_cap_rate(annual_noi: f64, purchase_price: f64) -> f64 {
    if purchase_price <= 0.0 {
        return 0.0;
    }
    round_to(annual_noi / purchase_price * 100.0, 2)
}

/// Appreciation since purchase, annualized as CAGR.
pub fn calculate_appreciation(
    current_value: f64,
    purchase_price: f64,
    purchase_date: NaiveDate,
) -> Appreciation {
    let elapsed_ms = (Utc::now().date_naive() - purchase_date).num_milliseconds() as f64;
    let years = elapsed_ms / MS_PER_YEAR;

    let total_appreciation = round_money(current_value - purchase_price);
    let annual_rate = if years <= 0.0 || purchase_price <= 0.0 {
        0.0
    } else {
        round_to(
            ((current_value / purchase_price).powf(1.0 / years) - 1.0) * 100.0,
            2,
        )
    };
    let total_return = if purchase_price > 0.0 {
        round_to(total_appreciation / purchase_price * 100.0, 2)
    } else {
        0.0
    };

    Appreciation {
        total_appreciation,
        annual_rate,
        total_return,
        years_held: years,
    }
}

/// Full valuation report: capitalized value plus purchase-anchored metrics
/// when purchase facts are available.
pub fn calculate_valuation(
    annual_noi: f64,
    cap_rate: f64,
    purchase_price: Option<f64>,
    purchase_date: Option<NaiveDate>,
) -> Result<ValuationReport, AppError> {
    let estimated_value = calculate_property_value(annual_noi, cap_rate)?;

    let implied_cap_rate = purchase_price.map(|price| calculate_implied_cap_rate(annual_noi, price));

    let appreciation = match (purchase_price, purchase_date) {
        (Some(price), Some(date)) => Some(calculate_appreciation(estimated_value, price, date)),
        _ => None,
    };

    let confidence = match (purchase_price, implied_cap_rate) {
        (None, _) => ValuationConfidence::Low,
        (Some(_), Some(implied)) if (cap_rate - implied).abs() < 1.0 => ValuationConfidence::High,
        _ => ValuationConfidence::Medium,
    };

    Ok(ValuationReport {
        estimated_value,
        cap_rate,
        implied_cap_rate,
        total_appreciation: appreciation.map(|a| a.total_appreciation),
        annual_appreciation_rate: appreciation.map(|a| a.annual_rate),
        total_return: appreciation.map(|a| a.total_return),
        confidence,
    })
}

/// Value after `years` of compounding at the given annual rate (percent).
pub fn project_future_value(current_value: f64, years: u32, annual_rate_percent: f64) -> f64 {
    round_money(current_value * (1.0 + annual_rate_percent / 100.0).powi(years as i32))
}

/// Per-year NOI with income and expenses compounding independently.
pub fn project_future_noi(
    income: f64,
    expenses: f64,
    years: u32,
    income_growth_percent: f64,
    expense_growth_percent: f64,
) -> Vec<YearlyNoi> {
    (1..=years)
        .map(|year| {
            let income_y =
                round_money(income * (1.0 + income_growth_percent / 100.0).powi(year as i32));
            let expenses_y =
                round_money(expenses * (1.0 + expense_growth_percent / 100.0).powi(year as i32));
            YearlyNoi {
                year,
                income: income_y,
                expenses: expenses_y,
                noi: round_money(income_y - expenses_y),
            }
        })
        .collect()
}

/// Multi-year value, cash-flow and equity projection. Equity accumulates
/// cash flow as a running sum on top of the value gain.
pub fn calculate_projections(
    current_value: f64,
    current_income: f64,
    current_expenses: f64,
    annual_debt_service: f64,
    assumptions: &ProjectionAssumptions,
) -> Vec<ProjectionYear> {
    let noi_by_year = project_future_noi(
        current_income,
        current_expenses,
        assumptions.years,
        assumptions.income_growth,
        assumptions.expense_growth,
    );

    let mut cumulative_cash_flow = 0.0;
    noi_by_year
        .into_iter()
        .map(|yearly| {
            let value = project_future_value(current_value, yearly.year, assumptions.appreciation_rate);
            let cash_flow = round_money(yearly.noi - annual_debt_service);
            cumulative_cash_flow = round_money(cumulative_cash_flow + cash_flow);
            ProjectionYear {
                year: yearly.year,
                value,
                noi: yearly.noi,
                cash_flow,
                equity: round_money((value - current_value) + cumulative_cash_flow),
            }
        })
        .collect()
}

/// Net proceeds of selling at a projected value.
pub fn calculate_sale_scenario(
    projected_value: f64,
    remaining_loan_balance: f64,
    selling_cost_rate: Option<f64>,
) -> SaleScenario {
    let rate = selling_cost_rate.unwrap_or(DEFAULT_SELLING_COST_RATE);
    let selling_costs = round_money(projected_value * rate);
    SaleScenario {
        projected_value,
        selling_costs,
        remaining_loan_balance,
        net_proceeds: round_money(projected_value - selling_costs - remaining_loan_balance),
    }
}

/// Typical cap rate by property type, substring-matched.
pub fn get_default_cap_rate(property_type: &str) -> f64 {
    let kind = property_type.to_lowercase();
    if kind.contains("single") {
        6.0
    } else if kind.contains("duplex")
        || kind.contains("triplex")
        || kind.contains("fourplex")
        || kind.contains("2-4")
    {
        7.0
    } else if kind.contains("multi") || kind.contains("apartment") || kind.contains("5+") {
        8.0
    } else if kind.contains("commercial") {
        10.0
    } else {
        7.0
    }
}

/// Valuation + projections for a stored property, using its financials and
/// the default cap rate for its type.
pub async fn valuate_property(
    store: &dyn RecordStore,
    property_id: Uuid,
) -> Result<PropertyValuation, AppError> {
    let property = store.fetch_property(property_id).await?;
    let financials = store.fetch_financials(property_id).await?;

    let annual_noi = financials.noi();
    let cap_rate = get_default_cap_rate(&property.property_type);
    let report = calculate_valuation(
        annual_noi,
        cap_rate,
        Some(property.purchase_price),
        Some(property.purchase_date),
    )?;
    let projections = calculate_projections(
        report.estimated_value,
        financials.annual_income,
        financials.annual_expenses,
        financials.annual_debt_service,
        &ProjectionAssumptions::default(),
    );

    Ok(PropertyValuation {
        property_id,
        annual_noi,
        cap_rate,
        report,
        projections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn value_is_noi_over_cap() {
        assert_eq!(calculate_property_value(42_000.0, 7.0).unwrap(), 600_000.0);
    }

    #[test]
    fn non_positive_cap_rate_is_an_error() {
        assert!(matches!(
            calculate_property_value(42_000.0, 0.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            calculate_property_value(42_000.0, -3.0),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn implied_cap_rate_returns_zero_without_price() {
        assert_eq!(calculate_implied_cap_rate(42_000.0, 0.0), 0.0);
        assert_eq!(calculate_implied_cap_rate(42_000.0, -1.0), 0.0);
        assert_eq!(calculate_implied_cap_rate(42_000.0, 600_000.0), 7.0);
    }

    #[test]
    fn no_gain_means_zero_appreciation() {
        let purchased = Utc::now().date_naive() - Duration::days(3 * 365);
        let a = calculate_appreciation(400_000.0, 400_000.0, purchased);
        assert_eq!(a.total_appreciation, 0.0);
        assert_eq!(a.annual_rate, 0.0);
        assert_eq!(a.total_return, 0.0);
    }

    #[test]
    fn same_day_purchase_has_zero_annual_rate() {
        let a = calculate_appreciation(450_000.0, 400_000.0, Utc::now().date_naive());
        assert_eq!(a.annual_rate, 0.0);
        assert_eq!(a.total_appreciation, 50_000.0);
    }

    #[test]
    fn confidence_tiers() {
        // No purchase price at all.
        let low = calculate_valuation(42_000.0, 7.0, None, None).unwrap();
        assert_eq!(low.confidence, ValuationConfidence::Low);

        // Implied cap (7.0) within a point of the supplied rate.
        let high = calculate_valuation(42_000.0, 7.5, Some(600_000.0), None).unwrap();
        assert_eq!(high.confidence, ValuationConfidence::High);

        // Implied cap far from the supplied rate.
        let medium = calculate_valuation(42_000.0, 10.0, Some(600_000.0), None).unwrap();
        assert_eq!(medium.confidence, ValuationConfidence::Medium);
    }

    #[test]
    fn future_value_compounds() {
        assert_eq!(project_future_value(100_000.0, 2, 10.0), 121_000.0);
        assert_eq!(project_future_value(100_000.0, 0, 10.0), 100_000.0);
    }

    #[test]
    fn noi_projection_compounds_independently() {
        let years = project_future_noi(60_000.0, 20_000.0, 2, 10.0, 0.0);
        assert_eq!(years.len(), 2);
        assert_eq!(years[1].income, 72_600.0);
        assert_eq!(years[1].expenses, 20_000.0);
        assert_eq!(years[1].noi, 52_600.0);
    }

    #[test]
    fn equity_accumulates_cash_flow() {
        let assumptions = ProjectionAssumptions {
            years: 3,
            appreciation_rate: 0.0,
            income_growth: 0.0,
            expense_growth: 0.0,
        };
        let years = calculate_projections(500_000.0, 60_000.0, 20_000.0, 30_000.0, &assumptions);
        // Flat value, flat 10k cash flow: equity is the running sum.
        assert_eq!(years[0].equity, 10_000.0);
        assert_eq!(years[1].equity, 20_000.0);
        assert_eq!(years[2].equity, 30_000.0);
    }

    #[test]
    fn sale_scenario_nets_out_costs_and_loan() {
        let sale = calculate_sale_scenario(600_000.0, 300_000.0, None);
        assert_eq!(sale.selling_costs, 36_000.0);
        assert_eq!(sale.net_proceeds, 264_000.0);
    }

    #[test]
    fn default_cap_rates_by_type() {
        assert_eq!(get_default_cap_rate("Single-Family Home"), 6.0);
        assert_eq!(get_default_cap_rate("Duplex"), 7.0);
        assert_eq!(get_default_cap_rate("Multi-Family (12 units)"), 8.0);
        assert_eq!(get_default_cap_rate("Commercial Retail"), 10.0);
        assert_eq!(get_default_cap_rate("Condo"), 7.0);
    }
}
