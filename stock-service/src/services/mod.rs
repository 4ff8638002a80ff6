pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::StockDb;
pub use memory::InMemoryStockStore;
pub use metrics::{get_metrics, init_metrics, record_lookup};
pub use store::StockStore;
