use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::api::server::AppState;

pub const SERVICE_STATUS: &str = "FoodTrace API LIVE";

/// Response for the service root
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Liveness banner
    pub status: String,
    /// Batch contract address
    pub contract_address: String,
    /// Address batch transactions are sent from
    pub account_address: String,
    /// Whether a dataset file was found at startup
    pub dataset_loaded: bool,
    /// Number of dataset records in memory
    pub records: usize,
}

/// Get service status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: SERVICE_STATUS.to_string(),
        contract_address: state.ledger.contract_address(),
        account_address: state.ledger.account_address(),
        dataset_loaded: state.dataset.is_loaded(),
        records: state.dataset.record_count(),
    })
}
