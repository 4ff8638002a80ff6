#![allow(dead_code)]

use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use stock_service::config::{HttpConfig, LookupStrategy, MongoConfig, StockConfig};
use stock_service::models::StockRecord;
use stock_service::services::InMemoryStockStore;
use stock_service::Application;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: InMemoryStockStore,
}

impl TestApp {
    /// Spawns the service with RELIANCE (3 records) and TCS (2 records) loaded.
    pub async fn spawn() -> Self {
        let store = InMemoryStockStore::new()
            .with_company("RELIANCE", reliance_records())
            .with_company("TCS", tcs_records());
        Self::spawn_with_store(store).await
    }

    pub async fn spawn_with_store(store: InMemoryStockStore) -> Self {
        let app = Application::build_with_store(test_config(), Arc::new(store.clone()))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
        }
    }

    pub fn stocks_url(&self, company: &str) -> String {
        format!("{}/api/stocks/{}", self.address, company)
    }
}

pub fn test_config() -> StockConfig {
    StockConfig {
        common: CoreConfig { port: 0 },
        mongodb: MongoConfig {
            uri: Secret::new("mongodb://unused.invalid:27017".to_string()),
            database: "Stocks".to_string(),
            connect_timeout_secs: 1,
        },
        lookup: LookupStrategy::CollectionPerCompany,
        http: HttpConfig {
            request_timeout_secs: 5,
        },
    }
}

pub fn record(date: &str, open: f64, close: f64, volume: u64) -> StockRecord {
    StockRecord {
        date: Some(date.to_string()),
        open_price: Some(open),
        high_price: Some(open.max(close) + 5.0),
        low_price: Some(open.min(close) - 5.0),
        close_price: Some(close),
        average_price: Some((open + close) / 2.0),
        volume: Some(volume),
        number_of_trades: Some(volume / 40),
        total_turnover: Some(volume as f64 * (open + close) / 2.0),
        deliverable_quantity: Some(volume / 2),
        percent_deliverable_to_traded: Some(50.0),
        spread_high_low: Some((open - close).abs() + 10.0),
        spread_close_open: Some(close - open),
    }
}

pub fn reliance_records() -> Vec<StockRecord> {
    vec![
        record("02-Apr-18", 922.0, 921.35, 4_317_539),
        record("03-Apr-18", 921.0, 930.1, 5_102_774),
        record("04-Apr-18", 931.5, 915.6, 6_001_213),
    ]
}

pub fn tcs_records() -> Vec<StockRecord> {
    vec![
        record("02-Apr-18", 2841.0, 2859.3, 1_204_338),
        record("03-Apr-18", 2860.0, 2837.75, 1_118_402),
    ]
}
