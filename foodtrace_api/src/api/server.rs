use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::handlers::{batches, districts, status};
use crate::config::Config;
use crate::dataset::DatasetStore;
use crate::ledger::{self, BatchLedger};

/// Application state shared by every handler.
///
/// The dataset is an immutable snapshot, so handlers read it without locking.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<DatasetStore>,
    pub ledger: Arc<dyn BatchLedger>,
}

impl AppState {
    pub fn new(dataset: DatasetStore, ledger: Arc<dyn BatchLedger>) -> Self {
        Self {
            dataset: Arc::new(dataset),
            ledger,
        }
    }
}

// API Router
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(status::get_status))
        // Dataset endpoints
        .route("/districts", get(districts::list_districts))
        .route("/safety/:district", get(districts::get_district_safety))
        .route("/stats", get(districts::get_top_districts))
        // Ledger endpoints
        .route("/add-batch", post(batches::add_batch))
        .route("/trace/:batch_id", get(batches::trace_batch))
        .layer(cors)
        .with_state(state)
}

// Server startup
pub async fn start_api_server(config: Config) -> Result<()> {
    info!("Starting FoodTrace Safety API");

    let dataset_path = config.dataset.path.clone();
    let dataset = tokio::task::spawn_blocking(move || DatasetStore::load(&dataset_path))
        .await
        .context("Dataset loader panicked")??;
    if !dataset.is_loaded() {
        info!("Serving without a dataset; district endpoints return empty results");
    }

    let ledger = ledger::connect(&config.ledger)?;
    info!(
        "Ledger backend: {} (contract {}, account {})",
        ledger.backend_name(),
        ledger.contract_address(),
        ledger.account_address()
    );

    let cors = config.cors.layer().context("Invalid CORS origin")?;
    let app = create_router(AppState::new(dataset, ledger), cors);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("FoodTrace API listening on http://{}", addr);
    info!("  GET  /                   - Service status");
    info!("  GET  /districts          - List districts");
    info!("  GET  /safety/:district   - District risk assessment");
    info!("  GET  /stats              - Top districts by area");
    info!("  POST /add-batch          - Record a batch on-chain");
    info!("  GET  /trace/:batch_id    - Trace a batch");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("FoodTrace API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
