use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATABASE: &str = "Stocks";
pub const DEFAULT_SHARED_COLLECTION: &str = "stocks";
pub const DEFAULT_COMPANY_FIELD: &str = "company";

#[derive(Debug, Clone, Deserialize)]
pub struct StockConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub lookup: LookupStrategy,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: Secret<String>,
    pub database: String,
    pub connect_timeout_secs: u64,
}

impl MongoConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// How a company key maps onto storage. Fixed for the lifetime of a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LookupStrategy {
    /// The company key is the collection name; every document in it belongs to
    /// that company.
    CollectionPerCompany,
    /// One collection holds all companies; documents are matched on
    /// `company_field == key`.
    SharedCollection {
        collection: String,
        company_field: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl StockConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Builds the service configuration from an arbitrary variable source.
    ///
    /// `MONGO_URI` (or `MONGODB_URI`) is mandatory; everything else has a default.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let uri = get("MONGO_URI")
            .or_else(|| get("MONGODB_URI"))
            .ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("MONGO_URI is required but not set"))
            })?;

        let lookup_strategy = match get("STOCKS_LOOKUP_MODE")
            .unwrap_or_else(|| "collection".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "collection" | "collection_per_company" => LookupStrategy::CollectionPerCompany,
            "field" | "shared" | "shared_collection" => LookupStrategy::SharedCollection {
                collection: get("STOCKS_COLLECTION")
                    .unwrap_or_else(|| DEFAULT_SHARED_COLLECTION.to_string()),
                company_field: get("STOCKS_COMPANY_FIELD")
                    .unwrap_or_else(|| DEFAULT_COMPANY_FIELD.to_string()),
            },
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "STOCKS_LOOKUP_MODE must be 'collection' or 'field', got '{}'",
                    other
                )));
            }
        };

        Ok(StockConfig {
            common,
            mongodb: MongoConfig {
                uri: Secret::new(uri),
                database: get("MONGO_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                connect_timeout_secs: parse_or(&get, "MONGO_CONNECT_TIMEOUT_SECS", 10)?,
            },
            lookup: lookup_strategy,
            http: HttpConfig {
                request_timeout_secs: parse_or(&get, "REQUEST_TIMEOUT_SECS", 30)?,
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
        }),
        None => Ok(default),
    }
}
