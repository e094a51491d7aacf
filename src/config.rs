/// Which market-data implementation to wire in. Mirrors the
/// `MARKET_DATA_PROVIDER` environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketDataBackend {
    Simulated,
    Live,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: Option<String>,
    pub market_data_backend: MarketDataBackend,
    pub market_data_api_url: Option<String>,
    pub market_data_api_key: Option<String>,
    pub rate_api_url: Option<String>,
}

impl EngineConfig {
    /// Load configuration from the process environment (reads `.env` first).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let backend = match std::env::var("MARKET_DATA_PROVIDER")
            .unwrap_or_else(|_| "simulated".to_string())
            .to_lowercase()
            .as_str()
        {
            "live" => MarketDataBackend::Live,
            _ => MarketDataBackend::Simulated,
        };

        Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            market_data_backend: backend,
            market_data_api_url: std::env::var("MARKET_DATA_API_URL").ok(),
            market_data_api_key: std::env::var("MARKET_DATA_API_KEY").ok(),
            rate_api_url: std::env::var("RATE_API_URL").ok(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.market_data_backend == MarketDataBackend::Live
            && self.market_data_api_url.is_none()
        {
            return Err(
                "MARKET_DATA_PROVIDER is 'live' but MARKET_DATA_API_URL is not set".to_string(),
            );
        }
        Ok(())
    }
}
