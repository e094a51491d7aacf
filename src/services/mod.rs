pub mod depreciation_service;
pub mod lease_optimizer_service;
pub mod market_intelligence_service;
pub mod pricing_policy;
pub mod refinancing_service;
pub mod valuation_service;
