pub mod live;
pub mod market_data;
pub mod rates;
pub mod simulated;

pub use live::LiveMarketData;
pub use market_data::{MarketDataError, MarketDataProvider};
pub use rates::{LiveRateProvider, RateProvider, RateProviderError, SimulatedRateProvider};
pub use simulated::SimulatedMarketData;
