use async_trait::async_trait;
use thiserror::Error;

use crate::errors::AppError;
use crate::models::{MarketAnalysis, MarketQuery};

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,
}

impl From<MarketDataError> for AppError {
    fn from(value: MarketDataError) -> Self {
        AppError::External(value.to_string())
    }
}

/// Source of rental-market analyses. Implementations are swappable between
/// the deterministic simulator and a live API without changing any caller.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_market_analysis(
        &self,
        query: &MarketQuery,
    ) -> Result<MarketAnalysis, MarketDataError>;
}
