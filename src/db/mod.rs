pub mod optimization_queries;
pub mod property_queries;
