//! HTTP handlers for weather lookups

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{validate_place, WeatherReading};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Query parameters for a weather lookup
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub place: String,
}

/// Get current weather for a place
pub async fn get_current_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> AppResult<Json<WeatherReading>> {
    validate_place(&query.place).map_err(|message| AppError::Validation {
        field: "place".to_string(),
        message: message.to_string(),
    })?;

    let reading = state
        .advisor
        .weather_provider()
        .fetch_weather(query.place.trim())
        .await?;
    Ok(Json(reading))
}
