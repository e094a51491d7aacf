pub mod config;
pub mod db;
pub mod errors;
pub mod external;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;

pub use errors::AppError;
pub use state::AppState;
