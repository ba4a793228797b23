use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Serialize;

use crate::api::server::AppState;
use crate::api::{ApiError, ApiResult};
use crate::safety::{self, RiskAssessment, RiskLevel};

/// Number of districts reported by `/stats`
pub const TOP_DISTRICTS: usize = 5;

/// Constant `records` value of every `/stats` entry. Clients depend on the
/// field being present; it is not a row count.
pub const STATS_RECORDS_PLACEHOLDER: u32 = 100;

#[derive(Debug, Serialize)]
pub struct DistrictListResponse {
    pub districts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DistrictStat {
    pub district: String,
    pub total_area: i64,
    pub risk: RiskLevel,
    pub priority: bool,
    pub records: u32,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub districts: Vec<DistrictStat>,
}

/// List every district in the dataset
pub async fn list_districts(State(state): State<AppState>) -> Json<DistrictListResponse> {
    Json(DistrictListResponse {
        districts: state.dataset.list_districts(),
    })
}

/// Risk assessment for one district
pub async fn get_district_safety(
    State(state): State<AppState>,
    Path(district): Path<String>,
) -> ApiResult<Json<RiskAssessment>> {
    if !state.dataset.is_loaded() {
        return Err(ApiError::dataset_not_loaded());
    }

    let aggregate = state
        .dataset
        .aggregate_district(&district)
        .ok_or_else(ApiError::district_not_found)?;

    Ok(Json(safety::assess(&aggregate)))
}

/// Districts with the largest cultivated area
pub async fn get_top_districts(State(state): State<AppState>) -> Json<StatsResponse> {
    let districts = state
        .dataset
        .top_by_area(TOP_DISTRICTS)
        .into_iter()
        .map(|aggregate| {
            let classification = safety::classify(aggregate.total_area);
            DistrictStat {
                district: aggregate.district,
                total_area: aggregate.total_area,
                risk: classification.risk_level,
                priority: classification.priority_monitoring,
                records: STATS_RECORDS_PLACEHOLDER,
            }
        })
        .collect();

    Json(StatsResponse { districts })
}
