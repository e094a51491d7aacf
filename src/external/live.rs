use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::external::market_data::{MarketDataError, MarketDataProvider};
use crate::models::{ComparableProperty, Confidence, MarketAnalysis, MarketQuery, RentTrendPoint};

/// Client for a live rental-market API. The endpoint is expected to return
/// the analysis document shape below for a zip + unit query.
pub struct LiveMarketData {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl LiveMarketData {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    pub fn from_env() -> Result<Self, MarketDataError> {
        let base_url = std::env::var("MARKET_DATA_API_URL")
            .map_err(|_| MarketDataError::BadResponse("MARKET_DATA_API_URL not set".into()))?;
        Ok(Self::new(base_url, std::env::var("MARKET_DATA_API_KEY").ok()))
    }
}

#[derive(Debug, Deserialize)]
struct ApiAnalysis {
    zip_code: String,
    median_rent: f64,
    growth_velocity: f64,
    #[serde(default)]
    rent_trend: Vec<ApiTrendPoint>,
    #[serde(default)]
    comparables: Vec<ApiComparable>,
    vacancy_rate: f64,
    avg_days_on_market: f64,
    confidence: Option<String>,
    // { "error": "unknown zip code" } on bad input
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiTrendPoint {
    month: String,
    median_rent: f64,
}

#[derive(Debug, Deserialize)]
struct ApiComparable {
    address: String,
    distance: f64,
    bedrooms: u32,
    bathrooms: f64,
    square_feet: f64,
    rent_amount: f64,
    listing_date: String,
}

#[async_trait]
impl MarketDataProvider for LiveMarketData {
    async fn get_market_analysis(
        &self,
        query: &MarketQuery,
    ) -> Result<MarketAnalysis, MarketDataError> {
        let url = format!("{}/v1/market-analysis", self.base_url.trim_end_matches('/'));

        let mut request = self.client.get(&url).query(&[
            ("zip", query.zip_code.as_str()),
            ("bedrooms", &query.bedrooms.to_string()),
            ("bathrooms", &query.bathrooms.to_string()),
            ("square_feet", &query.square_feet.to_string()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("apikey", key.as_str())]);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| MarketDataError::Network(e.to_string()))?;

        if resp.status().as_u16() == 429 {
            return Err(MarketDataError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(MarketDataError::BadResponse(format!(
                "status {}",
                resp.status()
            )));
        }

        let body = resp
            .json::<ApiAnalysis>()
            .await
            .map_err(|e| MarketDataError::Parse(e.to_string()))?;

        if let Some(msg) = body.error {
            return Err(MarketDataError::BadResponse(msg));
        }

        let comparables = body
            .comparables
            .into_iter()
            .map(|c| {
                let listing_date = NaiveDate::parse_from_str(&c.listing_date, "%Y-%m-%d")
                    .map_err(|e| MarketDataError::Parse(e.to_string()))?;
                Ok(ComparableProperty {
                    address: c.address,
                    distance: c.distance,
                    bedrooms: c.bedrooms,
                    bathrooms: c.bathrooms,
                    square_feet: c.square_feet,
                    rent_amount: c.rent_amount,
                    listing_date,
                })
            })
            .collect::<Result<Vec<_>, MarketDataError>>()?;

        let confidence = body
            .confidence
            .as_deref()
            .and_then(Confidence::parse)
            .unwrap_or(Confidence::Medium);

        Ok(MarketAnalysis {
            zip_code: body.zip_code,
            median_rent: body.median_rent,
            growth_velocity: body.growth_velocity,
            rent_trend: body
                .rent_trend
                .into_iter()
                .map(|p| RentTrendPoint {
                    month: p.month,
                    median_rent: p.median_rent,
                })
                .collect(),
            comparables,
            vacancy_rate: body.vacancy_rate,
            avg_days_on_market: body.avg_days_on_market,
            confidence,
        })
    }
}
