use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::api::server::AppState;
use crate::api::{ApiError, ApiResult};

/// Batch submission body
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub batch_id: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct BatchReceipt {
    pub tx_hash: String,
    pub batch_id: String,
}

#[derive(Debug, Serialize)]
pub struct BatchTrace {
    pub batch_id: String,
    pub data: String,
}

/// Record a batch on the ledger
pub async fn add_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<Json<BatchReceipt>> {
    let Json(batch) = payload.map_err(|e| ApiError::unprocessable_entity(&e.body_text()))?;

    match state.ledger.submit_batch(&batch.batch_id, &batch.data).await {
        Ok(tx_hash) => {
            info!("Batch {} recorded: {}", batch.batch_id, tx_hash);
            Ok(Json(BatchReceipt {
                tx_hash,
                batch_id: batch.batch_id,
            }))
        }
        Err(e) => {
            warn!("Batch {} submission failed: {}", batch.batch_id, e);
            Err(e.into())
        }
    }
}

/// Look up a batch on the ledger. Every ledger failure reads as "not found".
pub async fn trace_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<String>,
) -> ApiResult<Json<BatchTrace>> {
    match state.ledger.fetch_batch(&batch_id).await {
        Ok(data) => Ok(Json(BatchTrace { batch_id, data })),
        Err(e) => {
            warn!("Batch {} lookup failed: {}", batch_id, e);
            Err(ApiError::batch_not_found())
        }
    }
}
