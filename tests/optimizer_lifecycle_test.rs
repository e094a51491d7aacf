use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use propfolio_backend::errors::AppError;
use propfolio_backend::external::{MarketDataError, MarketDataProvider};
use propfolio_backend::models::{
    ComparableProperty, ConcessionKind, Confidence, MarketAnalysis, MarketPosition, MarketQuery,
    OptimizationStatus, OptimizePriceInput, Property, Tenant,
};
use propfolio_backend::services::lease_optimizer_service::{
    approve_optimization, get_optimization_history, optimize_price, reject_optimization,
};
use propfolio_backend::store::{MemoryRecordStore, RecordStore};

/// Market-data double returning one fixed analysis.
struct FixedMarketData(MarketAnalysis);

#[async_trait]
impl MarketDataProvider for FixedMarketData {
    async fn get_market_analysis(
        &self,
        _query: &MarketQuery,
    ) -> Result<MarketAnalysis, MarketDataError> {
        Ok(self.0.clone())
    }
}

fn comp(rent: f64, distance: f64) -> ComparableProperty {
    ComparableProperty {
        address: "4821 Maple Ave".to_string(),
        distance,
        bedrooms: 2,
        bathrooms: 1.0,
        square_feet: 900.0,
        rent_amount: rent,
        listing_date: NaiveDate::from_ymd_opt(2026, 7, 15).unwrap(),
    }
}

fn market(median: f64) -> FixedMarketData {
    FixedMarketData(MarketAnalysis {
        zip_code: "78701".to_string(),
        median_rent: median,
        growth_velocity: 3.0,
        rent_trend: vec![],
        comparables: vec![comp(2_000.0, 0.5), comp(2_100.0, 0.8), comp(1_950.0, 1.2)],
        vacancy_rate: 6.0,
        avg_days_on_market: 30.0,
        confidence: Confidence::High,
    })
}

fn seed_property(store: &MemoryRecordStore) -> (Uuid, Uuid) {
    let property_id = Uuid::new_v4();
    let tenant_id = Uuid::new_v4();
    store.insert_property(Property {
        id: property_id,
        address: "12 Elm Dr".to_string(),
        zip_code: "78701".to_string(),
        property_type: "Duplex".to_string(),
        purchase_price: 600_000.0,
        purchase_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
        total_units: 2,
        tenants: vec![Tenant {
            id: tenant_id,
            property_id,
            unit_label: Some("A".to_string()),
            rent_amount: 1_700.0,
            active: true,
        }],
    });
    (property_id, tenant_id)
}

fn input(property_id: Uuid, tenant_id: Uuid, occupancy: f64) -> OptimizePriceInput {
    OptimizePriceInput {
        property_id,
        tenant_id: Some(tenant_id),
        zip_code: "78701".to_string(),
        current_rent: 1_700.0,
        bedrooms: 2,
        bathrooms: 1.0,
        square_feet: 900.0,
        occupancy_rate: Some(occupancy),
    }
}

#[tokio::test]
async fn below_market_high_occupancy_raises_within_cap() {
    let store = MemoryRecordStore::new();
    let (property_id, tenant_id) = seed_property(&store);

    let record = optimize_price(&input(property_id, tenant_id, 90.0), &market(2_000.0), &store)
        .await
        .unwrap();

    assert_eq!(record.market_position, MarketPosition::BelowMarket);
    assert!(record.recommended_rent > 1_700.0);
    assert!(record.recommended_rent <= 1_700.0 * 1.15 + 0.01);
    assert_eq!(record.status, OptimizationStatus::Pending);
    assert!(!record.should_offer_concession);

    // The record is fetchable as persisted.
    let stored = store.fetch_optimization(record.id).await.unwrap();
    assert_eq!(stored.recommended_rent, record.recommended_rent);
}

#[tokio::test]
async fn deep_vacancy_generates_the_full_concession_ladder() {
    let store = MemoryRecordStore::new();
    let (property_id, tenant_id) = seed_property(&store);

    let record = optimize_price(&input(property_id, tenant_id, 40.0), &market(1_700.0), &store)
        .await
        .unwrap();

    assert!(record.should_offer_concession);
    let kinds: Vec<ConcessionKind> = record.concessions.iter().map(|c| c.kind).collect();
    assert!(kinds.contains(&ConcessionKind::FirstMonthDiscount));
    assert!(kinds.contains(&ConcessionKind::ReducedDeposit));
    assert!(kinds.contains(&ConcessionKind::AmenityUpgrade));
    // 40% is also below the 55% flexible-terms threshold.
    assert!(kinds.contains(&ConcessionKind::FlexibleTerms));
}

#[tokio::test]
async fn approve_applies_rent_once_and_conflicts_after() {
    let store = MemoryRecordStore::new();
    let (property_id, tenant_id) = seed_property(&store);

    let record = optimize_price(&input(property_id, tenant_id, 90.0), &market(2_000.0), &store)
        .await
        .unwrap();

    let approved = approve_optimization(record.id, "reviewer@example.com", &store)
        .await
        .unwrap();
    assert_eq!(approved.status, OptimizationStatus::Approved);
    assert_eq!(approved.reviewed_by.as_deref(), Some("reviewer@example.com"));
    assert!(approved.reviewed_at.is_some());
    assert_eq!(store.tenant_rent(tenant_id), Some(record.recommended_rent));
    assert_eq!(store.rent_update_count(tenant_id), 1);

    // Second approval reports a conflict and does not touch the rent again.
    let err = approve_optimization(record.id, "reviewer@example.com", &store)
        .await
        .unwrap_err();
    match err {
        AppError::Conflict(msg) => assert_eq!(msg, "Optimization already processed"),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(store.rent_update_count(tenant_id), 1);

    // Rejecting an approved record conflicts the same way.
    let err = reject_optimization(record.id, "reviewer@example.com", &store)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn reject_leaves_rent_untouched() {
    let store = MemoryRecordStore::new();
    let (property_id, tenant_id) = seed_property(&store);

    let record = optimize_price(&input(property_id, tenant_id, 90.0), &market(2_000.0), &store)
        .await
        .unwrap();
    let rejected = reject_optimization(record.id, "reviewer@example.com", &store)
        .await
        .unwrap();

    assert_eq!(rejected.status, OptimizationStatus::Rejected);
    assert_eq!(store.tenant_rent(tenant_id), Some(1_700.0));
    assert_eq!(store.rent_update_count(tenant_id), 0);
}

#[tokio::test]
async fn unknown_optimization_is_not_found() {
    let store = MemoryRecordStore::new();
    let err = approve_optimization(Uuid::new_v4(), "reviewer@example.com", &store)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn history_lists_a_property_newest_first() {
    let store = MemoryRecordStore::new();
    let (property_id, tenant_id) = seed_property(&store);
    let provider = market(2_000.0);

    let first = optimize_price(&input(property_id, tenant_id, 90.0), &provider, &store)
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = optimize_price(&input(property_id, tenant_id, 70.0), &provider, &store)
        .await
        .unwrap();

    let history = get_optimization_history(property_id, &store).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[1].id, first.id);

    let other = get_optimization_history(Uuid::new_v4(), &store).await.unwrap();
    assert!(other.is_empty());
}
