//! API error handling for FoodTrace

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned to API clients as `{"detail": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(skip)]
    pub code: u16,
    pub detail: String,
}

impl ApiError {
    pub fn new(code: u16, detail: String) -> Self {
        Self { code, detail }
    }

    // Common error constructors
    pub fn not_found(message: &str) -> Self {
        Self::new(404, message.to_string())
    }

    pub fn unprocessable_entity(message: &str) -> Self {
        Self::new(422, message.to_string())
    }

    pub fn internal_server_error(message: &str) -> Self {
        Self::new(500, message.to_string())
    }

    // Domain errors
    pub fn dataset_not_loaded() -> Self {
        Self::internal_server_error("Dataset not loaded")
    }

    pub fn district_not_found() -> Self {
        Self::not_found("District not found")
    }

    pub fn batch_not_found() -> Self {
        Self::not_found("Batch not found")
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API Error {}: {}", self.code, self.detail)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Ledger write failures surface their message verbatim
impl From<crate::ledger::LedgerError> for ApiError {
    fn from(err: crate::ledger::LedgerError) -> Self {
        Self::internal_server_error(&err.to_string())
    }
}
