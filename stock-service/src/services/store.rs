use crate::models::StockRecord;
use async_trait::async_trait;
use service_core::error::AppError;

/// Read-only access to stock records, keyed by company.
///
/// Implementations are shared across all request handlers and must be safe to
/// call concurrently.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// All records stored for `company`, in storage order. An unknown company
    /// yields an empty vector, not an error.
    async fn find_by_company(&self, company: &str) -> Result<Vec<StockRecord>, AppError>;

    /// Round-trips to the backend to confirm it is reachable.
    async fn health_check(&self) -> Result<(), AppError>;
}
