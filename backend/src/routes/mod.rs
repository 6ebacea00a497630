//! Route definitions for the EcoFarm advisor

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recommendations
        .route("/recommendations", post(handlers::create_recommendation))
        // Weather lookup for the place picker
        .route("/weather", get(handlers::get_current_weather))
        // Loaded model metadata
        .route("/model", get(handlers::get_model_info))
}
