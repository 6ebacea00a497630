//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub model: ModelSummary,
}

#[derive(Serialize)]
pub struct ModelSummary {
    pub features: usize,
    pub classes: usize,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // The artifact is validated at startup, so a running server always has one
    let artifact = state.advisor.artifact();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        model: ModelSummary {
            features: artifact.feature_plan().len(),
            classes: artifact.label_encoder().len(),
        },
    })
}
