use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use vostra_core::observability::init_tracing;
use vostra_core::InvoiceApi;
use vostra_frontend::config::{get_configuration, ApiMode};
use vostra_frontend::services::{DemoInvoiceStore, InvoiceClient};
use vostra_frontend::startup::build_router;
use vostra_frontend::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let telemetry = &configuration.telemetry;
    init_tracing(
        &telemetry.service_name,
        &telemetry.log_level,
        telemetry.otlp_endpoint.as_deref(),
    )?;

    vostra_frontend::services::metrics::init_metrics().context("Failed to register metrics")?;

    let api_settings = &configuration.invoice_api;
    let invoices: Arc<dyn InvoiceApi> = match api_settings.mode {
        ApiMode::Http => {
            let client =
                InvoiceClient::new(api_settings).context("Failed to build invoice API client")?;
            info!(base_url = %client.base_url(), "Using invoice backend");
            Arc::new(client)
        }
        ApiMode::Demo => {
            info!("Using in-memory demo invoices");
            Arc::new(
                DemoInvoiceStore::seeded(api_settings.max_upload_bytes)
                    .context("Failed to load demo invoices")?,
            )
        }
    };

    let state = AppState::new(
        invoices,
        api_settings.max_upload_bytes,
        api_settings.mode == ApiMode::Demo,
    );
    let app = build_router(state);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting vostra-frontend on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
