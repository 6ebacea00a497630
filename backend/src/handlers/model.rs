//! Model metadata handler

use axum::{extract::State, Json};
use serde::Serialize;
use shared::{OrganicMode, SOIL_TYPES};

use crate::AppState;

/// What the loaded model expects and can answer
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub features: Vec<String>,
    pub classes: Vec<String>,
    pub soil_types: Vec<String>,
    pub organic_mode: OrganicMode,
}

/// Describe the loaded model artifact
pub async fn get_model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    let artifact = state.advisor.artifact();

    Json(ModelInfo {
        features: artifact.feature_names().to_vec(),
        classes: artifact.label_encoder().classes.clone(),
        soil_types: SOIL_TYPES.iter().map(|s| s.to_string()).collect(),
        organic_mode: state.advisor.organic_mode(),
    })
}
