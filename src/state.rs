use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{EngineConfig, MarketDataBackend};
use crate::external::{
    LiveMarketData, LiveRateProvider, MarketDataProvider, RateProvider, SimulatedMarketData,
    SimulatedRateProvider,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub market_data: Arc<dyn MarketDataProvider>,
    pub rates: Arc<dyn RateProvider>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        market_data: Arc<dyn MarketDataProvider>,
        rates: Arc<dyn RateProvider>,
    ) -> Self {
        Self {
            pool,
            market_data,
            rates,
        }
    }
}

/// Select providers per configuration, like the `MARKET_DATA_PROVIDER`
/// switch documented in the deployment notes.
pub fn build_providers(
    config: &EngineConfig,
) -> Result<(Arc<dyn MarketDataProvider>, Arc<dyn RateProvider>), String> {
    config.validate()?;

    let market_data: Arc<dyn MarketDataProvider> = match config.market_data_backend {
        MarketDataBackend::Simulated => {
            tracing::info!("Using market data provider: simulated");
            Arc::new(SimulatedMarketData::new())
        }
        MarketDataBackend::Live => {
            let url = config
                .market_data_api_url
                .clone()
                .ok_or_else(|| "MARKET_DATA_API_URL not set".to_string())?;
            tracing::info!("Using market data provider: live ({})", url);
            Arc::new(LiveMarketData::new(url, config.market_data_api_key.clone()))
        }
    };

    let rates: Arc<dyn RateProvider> = match &config.rate_api_url {
        Some(url) => {
            tracing::info!("Using rate provider: live ({})", url);
            Arc::new(LiveRateProvider::new(url.clone()))
        }
        None => {
            tracing::info!("Using rate provider: simulated");
            Arc::new(SimulatedRateProvider::new())
        }
    };

    Ok((market_data, rates))
}
