use crate::config::{LookupStrategy, MongoConfig};
use crate::models::StockRecord;
use crate::services::StockStore;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::ClientOptions,
    Client as MongoClient, Collection, Database,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;

#[derive(Clone)]
pub struct StockDb {
    client: MongoClient,
    db: Database,
    lookup: LookupStrategy,
}

impl StockDb {
    /// Builds the client. The driver connects lazily, so callers should follow
    /// up with [`StockStore::health_check`] before serving traffic.
    pub async fn connect(config: &MongoConfig, lookup: LookupStrategy) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(config.uri.expose_secret())
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        options.app_name = Some("stock-service".to_string());
        options.connect_timeout = Some(config.connect_timeout());
        options.server_selection_timeout = Some(config.connect_timeout());

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(&config.database);

        tracing::info!(
            database = %config.database,
            lookup = ?lookup,
            "MongoDB client created"
        );
        Ok(Self { client, db, lookup })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Collection and filter for one company under the configured strategy.
    fn scope(&self, company: &str) -> (Collection<StockRecord>, Document) {
        match &self.lookup {
            LookupStrategy::CollectionPerCompany => (self.db.collection(company), doc! {}),
            LookupStrategy::SharedCollection {
                collection,
                company_field,
            } => {
                let mut filter = Document::new();
                filter.insert(company_field.as_str(), company);
                (self.db.collection(collection), filter)
            }
        }
    }
}

#[async_trait]
impl StockStore for StockDb {
    async fn find_by_company(&self, company: &str) -> Result<Vec<StockRecord>, AppError> {
        let (collection, filter) = self.scope(company);

        let cursor = collection.find(filter, None).await.map_err(|e| {
            tracing::error!(company = %company, "Stock query failed: {}", e);
            AppError::from(e)
        })?;

        let records: Vec<StockRecord> = cursor.try_collect().await.map_err(|e| {
            tracing::error!(company = %company, "Failed to read stock records: {}", e);
            AppError::from(e)
        })?;

        tracing::debug!(
            company = %company,
            collection = %collection.name(),
            count = records.len(),
            "Stock query completed"
        );
        Ok(records)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }
}
