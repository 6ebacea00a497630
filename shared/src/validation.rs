//! Validation utilities for advisory input
//!
//! Checks run in a fixed order and the first failure wins: place name, soil
//! type, missing nutrients, then value ranges.

use serde::Serialize;

use crate::models::{AdvisoryRequest, SoilSample};
use crate::types::SoilType;

pub const MSG_PLACE_REQUIRED: &str = "Please enter a city name";
pub const MSG_SOIL_TYPE_REQUIRED: &str = "Please select a soil type";
pub const MSG_NUTRIENTS_REQUIRED: &str = "Please fill in all nutrient values and pH";

/// Upper bound for N, P and K readings
pub const MAX_NUTRIENT: f64 = 300.0;
/// Upper bound for soil pH
pub const MAX_PH: f64 = 14.0;

/// First validation problem found in a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub message: String,
}

impl ValidationFailure {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub place: String,
    pub soil: SoilSample,
}

// ============================================================================
// Field Validations
// ============================================================================

/// Validate a place name (non-blank)
pub fn validate_place(place: &str) -> Result<(), &'static str> {
    if place.trim().is_empty() {
        return Err(MSG_PLACE_REQUIRED);
    }
    Ok(())
}

/// Validate a nutrient reading: whole number in 0-300
pub fn validate_nutrient(value: f64) -> Result<u16, &'static str> {
    if !value.is_finite() || value < 0.0 || value > MAX_NUTRIENT {
        return Err("must be between 0 and 300");
    }
    if value.fract() != 0.0 {
        return Err("must be a whole number");
    }
    Ok(value as u16)
}

/// Validate soil pH in 0.0-14.0
pub fn validate_ph(ph: f64) -> Result<(), &'static str> {
    if !ph.is_finite() || !(0.0..=MAX_PH).contains(&ph) {
        return Err("pH must be between 0.0 and 14.0");
    }
    Ok(())
}

// ============================================================================
// Request Validation
// ============================================================================

/// Validate a raw advisory request
pub fn validate_request(request: &AdvisoryRequest) -> Result<ValidatedRequest, ValidationFailure> {
    validate_place(&request.place).map_err(|m| ValidationFailure::new("place", m))?;

    let soil_type = request
        .soil_type
        .as_deref()
        .and_then(SoilType::parse)
        .ok_or_else(|| ValidationFailure::new("soil_type", MSG_SOIL_TYPE_REQUIRED))?;

    let (Some(nitrogen), Some(phosphorus), Some(potassium), Some(ph)) = (
        request.nitrogen,
        request.phosphorus,
        request.potassium,
        request.ph,
    ) else {
        return Err(ValidationFailure::new("nutrients", MSG_NUTRIENTS_REQUIRED));
    };

    let nutrient = |field: &'static str, label: &str, value: f64| {
        validate_nutrient(value)
            .map_err(|m| ValidationFailure::new(field, format!("{} {}", label, m)))
    };
    let nitrogen = nutrient("nitrogen", "Nitrogen (N)", nitrogen)?;
    let phosphorus = nutrient("phosphorus", "Phosphorus (P)", phosphorus)?;
    let potassium = nutrient("potassium", "Potassium (K)", potassium)?;
    validate_ph(ph).map_err(|m| ValidationFailure::new("ph", m))?;

    Ok(ValidatedRequest {
        place: request.place.trim().to_string(),
        soil: SoilSample {
            nitrogen,
            phosphorus,
            potassium,
            ph,
            soil_type,
        },
    })
}
