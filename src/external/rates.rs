use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::errors::AppError;
use crate::models::MarketRates;

#[derive(Debug, Error)]
pub enum RateProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<RateProviderError> for AppError {
    fn from(value: RateProviderError) -> Self {
        AppError::External(value.to_string())
    }
}

/// Source of current mortgage rates by loan category.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn get_current_market_rates(&self) -> Result<MarketRates, RateProviderError>;
}

/// Fixed published-average rate table for development and tests.
pub struct SimulatedRateProvider {
    rates: MarketRates,
}

impl SimulatedRateProvider {
    pub fn new() -> Self {
        Self {
            rates: MarketRates {
                conventional_30: 6.85,
                conventional_20: 6.55,
                conventional_15: 6.10,
                fha: 6.45,
                va: 6.30,
                jumbo: 7.05,
                commercial: 7.60,
                last_updated: Utc::now(),
            },
        }
    }

    pub fn with_rates(rates: MarketRates) -> Self {
        Self { rates }
    }
}

impl Default for SimulatedRateProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateProvider for SimulatedRateProvider {
    async fn get_current_market_rates(&self) -> Result<MarketRates, RateProviderError> {
        Ok(MarketRates {
            last_updated: Utc::now(),
            ..self.rates.clone()
        })
    }
}

/// Client for a live rate feed returning the JSON document below.
pub struct LiveRateProvider {
    client: reqwest::Client,
    url: String,
}

impl LiveRateProvider {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn from_env() -> Result<Self, RateProviderError> {
        let url = std::env::var("RATE_API_URL")
            .map_err(|_| RateProviderError::BadResponse("RATE_API_URL not set".into()))?;
        Ok(Self::new(url))
    }
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    conventional_30: f64,
    conventional_20: f64,
    conventional_15: f64,
    fha: f64,
    va: f64,
    jumbo: f64,
    commercial: f64,
}

#[async_trait]
impl RateProvider for LiveRateProvider {
    async fn get_current_market_rates(&self) -> Result<MarketRates, RateProviderError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RateProviderError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(RateProviderError::BadResponse(format!(
                "status {}",
                resp.status()
            )));
        }

        let body = resp
            .json::<RatesResponse>()
            .await
            .map_err(|e| RateProviderError::Parse(e.to_string()))?;

        Ok(MarketRates {
            conventional_30: body.conventional_30,
            conventional_20: body.conventional_20,
            conventional_15: body.conventional_15,
            fha: body.fha,
            va: body.va,
            jumbo: body.jumbo,
            commercial: body.commercial,
            last_updated: Utc::now(),
        })
    }
}
