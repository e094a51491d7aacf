use async_trait::async_trait;
use chrono::{Datelike, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::external::market_data::{MarketDataError, MarketDataProvider};
use crate::models::{ComparableProperty, Confidence, MarketAnalysis, MarketQuery, RentTrendPoint};
use crate::utils::{round_money, round_to};

const STREETS: &[&str] = &[
    "Oak St", "Maple Ave", "Cedar Ln", "Elm Dr", "Pine Ct", "Birch Rd", "Willow Way",
    "Juniper Blvd",
];

/// Deterministic market-data simulator. Every request builds its own RNG
/// seeded from the query, so the same query always produces the same
/// analysis and concurrent requests never interleave draws.
pub struct SimulatedMarketData;

impl SimulatedMarketData {
    pub fn new() -> Self {
        Self
    }

    fn seed_for(query: &MarketQuery) -> u64 {
        let zip_hash = query
            .zip_code
            .bytes()
            .fold(0u64, |h, b| h.wrapping_mul(31).wrapping_add(b as u64));
        zip_hash
            .wrapping_mul(31)
            .wrapping_add(query.bedrooms as u64)
            .wrapping_mul(31)
            .wrapping_add(query.square_feet as u64)
    }
}

impl Default for SimulatedMarketData {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for SimulatedMarketData {
    async fn get_market_analysis(
        &self,
        query: &MarketQuery,
    ) -> Result<MarketAnalysis, MarketDataError> {
        let seed = Self::seed_for(query);
        let mut rng = StdRng::seed_from_u64(seed);

        let zip_base = 1100.0 + (seed % 1400) as f64;
        let median_rent = round_money(
            (zip_base
                + query.bedrooms as f64 * 260.0
                + query.bathrooms * 120.0
                + (query.square_feet - 900.0) * 0.30)
                .max(650.0),
        );

        let growth_velocity = round_to(rng.random_range(-1.0..8.0), 2);
        let vacancy_rate = round_to(rng.random_range(3.0..12.0), 2);
        let avg_days_on_market = round_to(rng.random_range(15.0..45.0), 1);

        let today = Utc::now().date_naive();
        let monthly_growth = growth_velocity / 100.0 / 12.0;
        let rent_trend: Vec<RentTrendPoint> = (0..12)
            .map(|i| {
                let months_back = (11 - i) as i32;
                let jitter = rng.random_range(0.99..1.01);
                RentTrendPoint {
                    month: month_label(today.year(), today.month(), months_back),
                    median_rent: round_money(
                        median_rent / (1.0 + monthly_growth).powi(months_back) * jitter,
                    ),
                }
            })
            .collect();

        let comp_count: usize = rng.random_range(4..9);
        let comparables: Vec<ComparableProperty> = (0..comp_count)
            .map(|_| {
                let bed_delta: i32 = rng.random_range(-1..=1);
                let bedrooms = (query.bedrooms as i32 + bed_delta).max(1) as u32;
                let square_feet =
                    round_to(query.square_feet * rng.random_range(0.85..1.15), 0);
                let rent = round_money(
                    median_rent * rng.random_range(0.88..1.12) + bed_delta as f64 * 150.0,
                );
                ComparableProperty {
                    address: format!(
                        "{} {}",
                        rng.random_range(100..9900),
                        STREETS[rng.random_range(0..STREETS.len())]
                    ),
                    distance: round_to(rng.random_range(0.2..2.5), 2),
                    bedrooms,
                    bathrooms: query.bathrooms,
                    square_feet,
                    rent_amount: rent.max(500.0),
                    listing_date: today - Duration::days(rng.random_range(5..60)),
                }
            })
            .collect();

        let confidence = if comparables.len() >= 6 {
            Confidence::High
        } else if comparables.len() >= 3 {
            Confidence::Medium
        } else {
            Confidence::Low
        };

        Ok(MarketAnalysis {
            zip_code: query.zip_code.clone(),
            median_rent,
            growth_velocity,
            rent_trend,
            comparables,
            vacancy_rate,
            avg_days_on_market,
            confidence,
        })
    }
}

/// "YYYY-MM" for the month `back` months before (`year`, `month`).
fn month_label(year: i32, month: u32, back: i32) -> String {
    let total = year * 12 + month as i32 - 1 - back;
    format!("{:04}-{:02}", total.div_euclid(12), total.rem_euclid(12) + 1)
}
