//! HTTP handlers for crop recommendations

use axum::{extract::State, Json};
use shared::{AdvisoryReport, AdvisoryRequest};

use crate::error::AppResult;
use crate::AppState;

/// Produce a crop and fertilizer recommendation for one soil sample
pub async fn create_recommendation(
    State(state): State<AppState>,
    Json(request): Json<AdvisoryRequest>,
) -> AppResult<Json<AdvisoryReport>> {
    let report = state.advisor.recommend(&request).await?;
    Ok(Json(report))
}
