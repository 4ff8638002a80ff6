//! In-memory store for tests and local runs without MongoDB.

use crate::models::StockRecord;
use crate::services::StockStore;
use async_trait::async_trait;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Clone, Default)]
pub struct InMemoryStockStore {
    records: Arc<RwLock<HashMap<String, Vec<StockRecord>>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_company(self, company: &str, records: Vec<StockRecord>) -> Self {
        self.insert(company, records);
        self
    }

    /// Appends records for `company`.
    pub fn insert(&self, company: &str, records: Vec<StockRecord>) {
        let mut guard = match self.records.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.entry(company.to_string()).or_default().extend(records);
    }

    /// Simulates an outage: while set, every call fails with a database error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "in-memory store marked unavailable"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn find_by_company(&self, company: &str) -> Result<Vec<StockRecord>, AppError> {
        self.check_available()?;

        let guard = self
            .records
            .read()
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("stock store lock poisoned")))?;
        Ok(guard.get(company).cloned().unwrap_or_default())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.check_available()
    }
}
