use anyhow::Context;
use service_core::observability::init_tracing;
use stock_service::config::StockConfig;
use stock_service::services::init_metrics;
use stock_service::Application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("stock-service", "info", otlp_endpoint.as_deref())?;

    init_metrics()?;

    let config = StockConfig::load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })
        .context("Failed to load configuration")?;

    let application = Application::build(config)
        .await
        .context("Failed to start stock-service")?;
    application.run_until_stopped().await?;

    Ok(())
}
