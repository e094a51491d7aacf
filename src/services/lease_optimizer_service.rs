use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::external::MarketDataProvider;
use crate::models::{
    Concession, ConcessionKind, MarketQuery, OptimizationRecord, OptimizationStatus,
    OptimizePriceInput, Property,
};
use crate::services::market_intelligence_service::generate_pricing_recommendation;
use crate::services::pricing_policy::OccupancyBand;
use crate::store::RecordStore;
use crate::utils::round_to;

/// Occupancy below which concessions are offered at all.
pub const CONCESSION_OCCUPANCY: f64 = 60.0;
/// Below this, also offer a reduced security deposit.
pub const REDUCED_DEPOSIT_OCCUPANCY: f64 = 50.0;
/// Below this, also offer flexible lease terms.
pub const FLEXIBLE_TERMS_OCCUPANCY: f64 = 55.0;

/// Produce and persist a pricing recommendation for one unit. The record is
/// created `pending` and waits for an approve/reject decision.
pub async fn optimize_price(
    input: &OptimizePriceInput,
    market_data: &dyn MarketDataProvider,
    store: &dyn RecordStore,
) -> Result<OptimizationRecord, AppError> {
    if input.current_rent <= 0.0 {
        return Err(AppError::Validation(
            "current rent must be positive".to_string(),
        ));
    }

    let query = MarketQuery {
        zip_code: input.zip_code.clone(),
        bedrooms: input.bedrooms,
        bathrooms: input.bathrooms,
        square_feet: input.square_feet,
        current_rent: Some(input.current_rent),
    };
    let analysis = market_data.get_market_analysis(&query).await?;

    let recommendation = generate_pricing_recommendation(
        input.current_rent,
        &analysis,
        input.occupancy_rate,
        input.bedrooms,
        input.square_feet,
    )?;

    // Occupancy overlay: the numeric decision already came from the shared
    // policy table; here we add the operator-facing strategy notes and any
    // concessions for a struggling property.
    let band = OccupancyBand::from_rate(input.occupancy_rate);
    let mut reasoning = recommendation.reasoning.clone();
    match band {
        OccupancyBand::High => reasoning.push(
            "Strategy: strong occupancy, prioritize rate over fill".to_string(),
        ),
        OccupancyBand::Normal => reasoning.push(
            "Strategy: healthy occupancy, track the market".to_string(),
        ),
        OccupancyBand::Low => reasoning.push(
            "Strategy: prioritize filling units over rate; pair pricing with concessions"
                .to_string(),
        ),
        OccupancyBand::Unknown => {}
    }

    let concessions = match input.occupancy_rate {
        Some(rate) if rate < CONCESSION_OCCUPANCY => generate_concessions(rate),
        _ => Vec::new(),
    };

    let record = OptimizationRecord {
        id: Uuid::new_v4(),
        property_id: input.property_id,
        tenant_id: input.tenant_id,
        zip_code: input.zip_code.clone(),
        bedrooms: input.bedrooms,
        bathrooms: input.bathrooms,
        square_feet: input.square_feet,
        occupancy_rate: input.occupancy_rate,
        current_rent: recommendation.current_rent,
        recommended_rent: recommendation.recommended_rent,
        change_amount: recommendation.change_amount,
        change_percent: recommendation.change_percent,
        market_position: recommendation.market_position,
        confidence: recommendation.confidence,
        reasoning,
        insights: recommendation
            .insights
            .iter()
            .map(|i| i.message.clone())
            .collect(),
        should_offer_concession: !concessions.is_empty(),
        concessions,
        status: OptimizationStatus::Pending,
        reviewed_by: None,
        reviewed_at: None,
        created_at: Utc::now(),
    };

    store.create_optimization(&record).await?;
    info!(
        optimization_id = %record.id,
        property_id = %record.property_id,
        recommended_rent = record.recommended_rent,
        "created pending rent optimization"
    );
    Ok(record)
}

/// Concession ladder for a struggling property. Offered only below 60%
/// occupancy; the deposit and lease-term sweeteners need deeper vacancy.
fn generate_concessions(occupancy_rate: f64) -> Vec<Concession> {
    let mut concessions = vec![Concession {
        kind: ConcessionKind::FirstMonthDiscount,
        description: "Offer 50% off the first month's rent on a 12-month lease".to_string(),
    }];
    if occupancy_rate < REDUCED_DEPOSIT_OCCUPANCY {
        concessions.push(Concession {
            kind: ConcessionKind::ReducedDeposit,
            description: "Reduce the security deposit to half a month's rent".to_string(),
        });
    }
    concessions.push(Concession {
        kind: ConcessionKind::AmenityUpgrade,
        description: "Include an amenity upgrade (parking, storage or appliance refresh)"
            .to_string(),
    });
    if occupancy_rate < FLEXIBLE_TERMS_OCCUPANCY {
        concessions.push(Concession {
            kind: ConcessionKind::FlexibleTerms,
            description: "Offer 6- or 18-month lease terms in addition to 12".to_string(),
        });
    }
    concessions
}

/// Approve a pending optimization. The store applies the status transition
/// and the tenant rent write atomically; a second attempt reports a
/// conflict instead of re-applying the rent.
pub async fn approve_optimization(
    id: Uuid,
    reviewer: &str,
    store: &dyn RecordStore,
) -> Result<OptimizationRecord, AppError> {
    let record = store.approve_optimization(id, reviewer).await?;
    info!(
        optimization_id = %id,
        reviewer,
        recommended_rent = record.recommended_rent,
        "optimization approved"
    );
    Ok(record)
}

/// Reject a pending optimization.
pub async fn reject_optimization(
    id: Uuid,
    reviewer: &str,
    store: &dyn RecordStore,
) -> Result<OptimizationRecord, AppError> {
    let record = store.reject_optimization(id, reviewer).await?;
    info!(optimization_id = %id, reviewer, "optimization rejected");
    Ok(record)
}

/// All optimizations recorded for a property, newest first.
pub async fn get_optimization_history(
    property_id: Uuid,
    store: &dyn RecordStore,
) -> Result<Vec<OptimizationRecord>, AppError> {
    store.list_optimizations(property_id).await
}

/// Percent of a property's units with an active tenant. 0 for a property
/// with no units.
pub fn calculate_property_occupancy(property: &Property) -> f64 {
    if property.total_units == 0 {
        return 0.0;
    }
    let occupied = property
        .tenants
        .iter()
        .filter(|t| t.active)
        .count()
        .min(property.total_units as usize);
    round_to(occupied as f64 / property.total_units as f64 * 100.0, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn concession_ladder_by_occupancy() {
        let kinds = |rate: f64| -> Vec<ConcessionKind> {
            generate_concessions(rate).iter().map(|c| c.kind).collect()
        };

        // 40%: everything qualifies.
        assert_eq!(
            kinds(40.0),
            vec![
                ConcessionKind::FirstMonthDiscount,
                ConcessionKind::ReducedDeposit,
                ConcessionKind::AmenityUpgrade,
                ConcessionKind::FlexibleTerms,
            ]
        );
        // 52%: deposit reduction no longer qualifies, flexible terms still does.
        assert_eq!(
            kinds(52.0),
            vec![
                ConcessionKind::FirstMonthDiscount,
                ConcessionKind::AmenityUpgrade,
                ConcessionKind::FlexibleTerms,
            ]
        );
        // 57%: only the unconditional pair.
        assert_eq!(
            kinds(57.0),
            vec![
                ConcessionKind::FirstMonthDiscount,
                ConcessionKind::AmenityUpgrade,
            ]
        );
    }

    #[test]
    fn occupancy_from_active_tenants() {
        let property_id = Uuid::new_v4();
        let tenant = |active: bool| crate::models::Tenant {
            id: Uuid::new_v4(),
            property_id,
            unit_label: None,
            rent_amount: 1_500.0,
            active,
        };
        let property = Property {
            id: property_id,
            address: "12 Elm Dr".to_string(),
            zip_code: "78701".to_string(),
            property_type: "Multi-Family".to_string(),
            purchase_price: 900_000.0,
            purchase_date: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
            total_units: 4,
            tenants: vec![tenant(true), tenant(true), tenant(true), tenant(false)],
        };
        assert_eq!(calculate_property_occupancy(&property), 75.0);

        let empty = Property {
            total_units: 0,
            tenants: vec![],
            ..property
        };
        assert_eq!(calculate_property_occupancy(&empty), 0.0);
    }
}
