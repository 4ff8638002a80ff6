//! HTTP handlers for stock-service.

pub mod health;
pub mod stocks;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use stocks::get_company_stocks;
