//! Error handling for the EcoFarm advisor
//!
//! Validation and weather errors are expected and carry corrective text.
//! Artifact errors mean the model bundle is corrupt or mismatched and are
//! surfaced as internal errors, never papered over with a default crop.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ValidationFailure;
use thiserror::Error;

use crate::external::weather::WeatherFetchError;
use crate::models::ArtifactError;

/// Message shown for every weather failure, whatever the cause
pub const WEATHER_FETCH_MESSAGE: &str = "Could not fetch weather data. Please check the city name.";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // External service errors
    #[error("Weather fetch failed: {0}")]
    WeatherFetch(#[from] WeatherFetchError),

    // Model artifact errors
    #[error("Artifact consistency error: {0}")]
    ArtifactConsistency(String),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<ValidationFailure> for AppError {
    fn from(failure: ValidationFailure) -> Self {
        AppError::Validation {
            field: failure.field.to_string(),
            message: failure.message,
        }
    }
}

impl AppError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::WeatherFetch(_) => "WEATHER_FETCH_FAILED",
            AppError::ArtifactConsistency(_) | AppError::Artifact(_) => "ARTIFACT_CONSISTENCY_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::WeatherFetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller can fix the problem by changing the request
    pub fn is_user_recoverable(&self) -> bool {
        matches!(self, AppError::Validation { .. } | AppError::WeatherFetch(_))
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (message, field) = match &self {
            AppError::Validation { field, message } => (message.clone(), Some(field.clone())),
            AppError::WeatherFetch(_) => (WEATHER_FETCH_MESSAGE.to_string(), None),
            AppError::ArtifactConsistency(_) | AppError::Artifact(_) => (
                "The recommendation model is inconsistent; please contact support".to_string(),
                None,
            ),
            AppError::Configuration(msg) => (format!("Configuration error: {}", msg), None),
            AppError::InternalError(_) => ("An internal server error occurred".to_string(), None),
        };

        if self.is_user_recoverable() {
            tracing::warn!("Request rejected: {}", self);
        } else {
            tracing::error!("Error: {:?}", self);
        }

        let detail = ErrorDetail {
            code: self.code().to_string(),
            message,
            field,
        };
        (self.status(), Json(ErrorResponse { error: detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
