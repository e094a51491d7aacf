use crate::errors::AppError;
use crate::models::{
    ComparableProperty, Confidence, InsightKind, MarketAnalysis, MarketInsight, MarketPosition,
    PricingRecommendation,
};
use crate::services::pricing_policy::{pricing_rule, target_rent, OccupancyBand};
use crate::utils::{round_money, round_to};

/// Comparables farther than this (miles) are ignored.
pub const DEFAULT_MAX_COMP_DISTANCE: f64 = 2.0;
pub const DEFAULT_COMP_LIMIT: usize = 3;

/// Rent within ±10% of the median counts as at-market.
const POSITION_THRESHOLD_PCT: f64 = 10.0;

#[derive(Debug, Clone, Copy)]
pub struct MarketPositionAnalysis {
    pub position: MarketPosition,
    /// Where the current rent ranks among the comparables, 0–100.
    pub percentile: f64,
}

/// Classify a rent against the market median and rank it among comparables.
pub fn analyze_market_position(
    current_rent: f64,
    market_median: f64,
    comparables: &[ComparableProperty],
) -> MarketPositionAnalysis {
    let percent_diff = if market_median > 0.0 {
        (current_rent - market_median) / market_median * 100.0
    } else {
        0.0
    };

    let position = if percent_diff > POSITION_THRESHOLD_PCT {
        MarketPosition::AboveMarket
    } else if percent_diff < -POSITION_THRESHOLD_PCT {
        MarketPosition::BelowMarket
    } else {
        MarketPosition::AtMarket
    };

    let mut rents: Vec<f64> = comparables.iter().map(|c| c.rent_amount).collect();
    rents.push(current_rent);
    rents.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let at_or_below = rents.iter().filter(|r| **r <= current_rent).count();
    let percentile = round_to(at_or_below as f64 / rents.len() as f64 * 100.0, 1);

    MarketPositionAnalysis {
        position,
        percentile,
    }
}

/// Threshold-driven observations about a market, for human review.
pub fn generate_market_insights(
    analysis: &MarketAnalysis,
    current_rent: f64,
) -> Vec<MarketInsight> {
    let mut insights = Vec::new();

    if analysis.growth_velocity > 5.0 {
        insights.push(MarketInsight {
            kind: InsightKind::Opportunity,
            message: format!(
                "Strong rent growth of {:.1}%/yr in {}",
                analysis.growth_velocity, analysis.zip_code
            ),
        });
    } else if analysis.growth_velocity < 1.0 {
        insights.push(MarketInsight {
            kind: InsightKind::Warning,
            message: format!(
                "Rent growth has stalled at {:.1}%/yr",
                analysis.growth_velocity
            ),
        });
    }

    if analysis.vacancy_rate < 5.0 {
        insights.push(MarketInsight {
            kind: InsightKind::Opportunity,
            message: format!("Tight market: vacancy at {:.1}%", analysis.vacancy_rate),
        });
    } else if analysis.vacancy_rate > 10.0 {
        insights.push(MarketInsight {
            kind: InsightKind::Warning,
            message: format!("Elevated vacancy at {:.1}%", analysis.vacancy_rate),
        });
    }

    if analysis.avg_days_on_market < 20.0 {
        insights.push(MarketInsight {
            kind: InsightKind::Opportunity,
            message: format!(
                "Units lease quickly: {:.0} days on market on average",
                analysis.avg_days_on_market
            ),
        });
    } else if analysis.avg_days_on_market > 40.0 {
        insights.push(MarketInsight {
            kind: InsightKind::Warning,
            message: format!(
                "Units sit for {:.0} days on market on average",
                analysis.avg_days_on_market
            ),
        });
    }

    let position =
        analyze_market_position(current_rent, analysis.median_rent, &analysis.comparables)
            .position;
    match position {
        MarketPosition::BelowMarket => insights.push(MarketInsight {
            kind: InsightKind::Opportunity,
            message: "Current rent is below market; there is room to raise".to_string(),
        }),
        MarketPosition::AboveMarket => insights.push(MarketInsight {
            kind: InsightKind::Warning,
            message: "Current rent is above market; renewal risk is elevated".to_string(),
        }),
        MarketPosition::AtMarket => {}
    }

    insights
}

fn relevance(
    comp: &ComparableProperty,
    target_bedrooms: u32,
    target_square_feet: f64,
    max_distance: f64,
) -> f64 {
    let bedroom_match = if comp.bedrooms == target_bedrooms {
        1.0
    } else {
        0.7
    };
    let sqft_match = if target_square_feet > 0.0 {
        (1.0 - (comp.square_feet - target_square_feet).abs() / target_square_feet).max(0.0)
    } else {
        0.0
    };
    let distance_score = 1.0 - comp.distance / max_distance;
    0.4 * bedroom_match + 0.4 * sqft_match + 0.2 * distance_score
}

/// The most relevant nearby comparables: filtered by distance, scored on
/// bedrooms / square footage / proximity, best first.
pub fn find_best_comparables(
    comparables: &[ComparableProperty],
    target_bedrooms: u32,
    target_square_feet: f64,
    max_distance: f64,
    limit: usize,
) -> Vec<ComparableProperty> {
    let mut scored: Vec<(f64, &ComparableProperty)> = comparables
        .iter()
        .filter(|c| c.distance <= max_distance)
        .map(|c| {
            (
                relevance(c, target_bedrooms, target_square_feet, max_distance),
                c,
            )
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, c)| c.clone())
        .collect()
}

/// Pricing advice for one unit from a market analysis, occupancy and unit
/// characteristics. The decision table in `pricing_policy` picks the move;
/// this assembles targets, confidence and reasoning around it.
pub fn generate_pricing_recommendation(
    current_rent: f64,
    analysis: &MarketAnalysis,
    occupancy_rate: Option<f64>,
    bedrooms: u32,
    square_feet: f64,
) -> Result<PricingRecommendation, AppError> {
    if current_rent <= 0.0 {
        return Err(AppError::Validation(
            "current rent must be positive".to_string(),
        ));
    }

    let best_comps = find_best_comparables(
        &analysis.comparables,
        bedrooms,
        square_feet,
        DEFAULT_MAX_COMP_DISTANCE,
        DEFAULT_COMP_LIMIT,
    );
    let avg_comp_rent = if best_comps.is_empty() {
        None
    } else {
        Some(best_comps.iter().map(|c| c.rent_amount).sum::<f64>() / best_comps.len() as f64)
    };

    let position_analysis =
        analyze_market_position(current_rent, analysis.median_rent, &analysis.comparables);
    let band = OccupancyBand::from_rate(occupancy_rate);
    let outcome = pricing_rule(band, position_analysis.position, analysis.growth_velocity);

    let recommended_rent = target_rent(
        outcome.action,
        current_rent,
        analysis.median_rent,
        avg_comp_rent,
    );
    let change_amount = round_money(recommended_rent - current_rent);
    let change_percent = round_to(change_amount / current_rent * 100.0, 2);

    let mut reasoning = vec![format!(
        "Rent of {:.2} is {} (median {:.2}, {}th percentile of comparables)",
        current_rent,
        position_analysis.position.as_str().replace('_', " "),
        analysis.median_rent,
        position_analysis.percentile.round()
    )];
    reasoning.extend(outcome.messages);
    reasoning.push(format!(
        "{} relevant comparables within {:.1} miles",
        best_comps.len(),
        DEFAULT_MAX_COMP_DISTANCE
    ));

    let confidence = score_confidence(analysis.confidence, best_comps.len(), occupancy_rate);
    let insights = generate_market_insights(analysis, current_rent);

    Ok(PricingRecommendation {
        recommended_rent,
        current_rent,
        change_amount,
        change_percent,
        confidence,
        market_position: position_analysis.position,
        reasoning,
        insights,
    })
}

/// Confidence points: market confidence 3/2/1, comparables 2/1/0, occupancy
/// data 1/0. ≥5 HIGH, ≥3 MEDIUM, else LOW.
fn score_confidence(
    market_confidence: Confidence,
    comparables_available: usize,
    occupancy_rate: Option<f64>,
) -> Confidence {
    let mut points = match market_confidence {
        Confidence::High => 3,
        Confidence::Medium => 2,
        Confidence::Low => 1,
    };
    points += match comparables_available {
        n if n >= 3 => 2,
        n if n >= 1 => 1,
        _ => 0,
    };
    if occupancy_rate.is_some() {
        points += 1;
    }

    if points >= 5 {
        Confidence::High
    } else if points >= 3 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn comp(rent: f64, distance: f64, bedrooms: u32, square_feet: f64) -> ComparableProperty {
        ComparableProperty {
            address: "100 Oak St".to_string(),
            distance,
            bedrooms,
            bathrooms: 1.0,
            square_feet,
            rent_amount: rent,
            listing_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
        }
    }

    fn analysis(median: f64, growth: f64, comps: Vec<ComparableProperty>) -> MarketAnalysis {
        MarketAnalysis {
            zip_code: "78701".to_string(),
            median_rent: median,
            growth_velocity: growth,
            rent_trend: vec![],
            comparables: comps,
            vacancy_rate: 6.0,
            avg_days_on_market: 30.0,
            confidence: Confidence::High,
        }
    }

    #[test]
    fn position_thresholds_are_ten_percent() {
        let comps = vec![comp(2_000.0, 1.0, 2, 900.0)];
        assert_eq!(
            analyze_market_position(2_250.0, 2_000.0, &comps).position,
            MarketPosition::AboveMarket
        );
        assert_eq!(
            analyze_market_position(1_750.0, 2_000.0, &comps).position,
            MarketPosition::BelowMarket
        );
        assert_eq!(
            analyze_market_position(2_100.0, 2_000.0, &comps).position,
            MarketPosition::AtMarket
        );
    }

    #[test]
    fn percentile_ranks_within_comparables() {
        let comps = vec![
            comp(1_800.0, 1.0, 2, 900.0),
            comp(2_000.0, 1.0, 2, 900.0),
            comp(2_200.0, 1.0, 2, 900.0),
        ];
        let result = analyze_market_position(1_900.0, 2_000.0, &comps);
        // 1900 sits above one of four rents.
        assert_eq!(result.percentile, 50.0);
    }

    #[test]
    fn insights_fire_on_thresholds() {
        let mut a = analysis(2_000.0, 6.0, vec![]);
        a.vacancy_rate = 4.0;
        a.avg_days_on_market = 15.0;
        let insights = generate_market_insights(&a, 1_700.0);
        // Growth, vacancy, velocity and position all fire as opportunities.
        assert_eq!(insights.len(), 4);
        assert!(insights
            .iter()
            .all(|i| i.kind == InsightKind::Opportunity));

        let mut a = analysis(2_000.0, 0.5, vec![]);
        a.vacancy_rate = 12.0;
        a.avg_days_on_market = 45.0;
        let insights = generate_market_insights(&a, 2_400.0);
        assert_eq!(insights.len(), 4);
        assert!(insights.iter().all(|i| i.kind == InsightKind::Warning));
    }

    #[test]
    fn quiet_market_yields_no_insights() {
        let a = analysis(2_000.0, 3.0, vec![]);
        assert!(generate_market_insights(&a, 2_000.0).is_empty());
    }

    #[test]
    fn comparables_filtered_by_distance_and_ranked() {
        let comps = vec![
            comp(2_000.0, 3.5, 2, 900.0), // too far
            comp(2_100.0, 0.3, 2, 900.0), // exact match, close
            comp(1_900.0, 1.8, 3, 1_400.0), // wrong bedrooms, wrong size
            comp(2_050.0, 0.8, 2, 950.0), // near match
        ];
        let best = find_best_comparables(&comps, 2, 900.0, 2.0, 3);
        assert_eq!(best.len(), 3);
        assert_eq!(best[0].rent_amount, 2_100.0);
        assert_eq!(best[1].rent_amount, 2_050.0);
    }

    #[test]
    fn high_occupancy_below_market_raises_within_cap() {
        let comps = vec![
            comp(2_000.0, 0.5, 2, 900.0),
            comp(2_100.0, 0.8, 2, 920.0),
            comp(1_950.0, 1.0, 2, 880.0),
        ];
        let a = analysis(2_000.0, 3.0, comps);
        let rec =
            generate_pricing_recommendation(1_700.0, &a, Some(90.0), 2, 900.0).unwrap();
        assert_eq!(rec.market_position, MarketPosition::BelowMarket);
        assert!(rec.recommended_rent > 1_700.0);
        assert!(rec.recommended_rent <= 1_700.0 * 1.15 + 0.01);
    }

    #[test]
    fn low_occupancy_discounts_at_market_unit() {
        let a = analysis(1_900.0, 3.0, vec![comp(1_900.0, 0.5, 2, 900.0)]);
        let rec =
            generate_pricing_recommendation(2_000.0, &a, Some(55.0), 2, 900.0).unwrap();
        assert!(rec.recommended_rent < 2_000.0);
        assert!(rec.recommended_rent >= 2_000.0 * 0.95 - 0.01);
    }

    #[test]
    fn confidence_scoring() {
        assert_eq!(
            score_confidence(Confidence::High, 3, Some(90.0)),
            Confidence::High
        );
        assert_eq!(
            score_confidence(Confidence::Medium, 1, None),
            Confidence::Medium
        );
        assert_eq!(score_confidence(Confidence::Low, 0, None), Confidence::Low);
        // 2 + 2 + 1 = 5 just reaches HIGH.
        assert_eq!(
            score_confidence(Confidence::Medium, 3, Some(70.0)),
            Confidence::High
        );
    }

    #[test]
    fn zero_rent_is_a_validation_error() {
        let a = analysis(2_000.0, 3.0, vec![]);
        assert!(matches!(
            generate_pricing_recommendation(0.0, &a, None, 2, 900.0),
            Err(AppError::Validation(_))
        ));
    }
}
