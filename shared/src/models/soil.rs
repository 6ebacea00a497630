//! Soil sample models

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::types::SoilType;

/// A validated soil sample
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoilSample {
    /// Nitrogen (kg/ha), 0-300
    pub nitrogen: u16,
    /// Phosphorus (kg/ha), 0-300
    pub phosphorus: u16,
    /// Potassium (kg/ha), 0-300
    pub potassium: u16,
    /// Soil pH, 0-14
    pub ph: f64,
    pub soil_type: SoilType,
}

/// Raw advisory input as submitted by a grower
///
/// Every field may be blank; `validation::validate_request` turns it into a
/// `SoilSample` plus a place name or reports the first problem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub soil_type: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub nitrogen: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub phosphorus: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub potassium: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub ph: Option<f64>,
}

impl AdvisoryRequest {
    pub fn new(place: impl Into<String>, soil_type: impl Into<String>) -> Self {
        Self {
            place: place.into(),
            soil_type: Some(soil_type.into()),
            ..Default::default()
        }
    }

    pub fn with_nutrients(mut self, nitrogen: f64, phosphorus: f64, potassium: f64, ph: f64) -> Self {
        self.nitrogen = Some(nitrogen);
        self.phosphorus = Some(phosphorus);
        self.potassium = Some(potassium);
        self.ph = Some(ph);
        self
    }
}

/// Accept a number, a numeric string, `null` or a blank string
///
/// Form submissions send empty fields as `""`; those read as missing. Text
/// that is not a number becomes NaN so range validation reports the field.
fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    struct ReadingVisitor;

    impl<'de> Visitor<'de> for ReadingVisitor {
        type Value = Option<f64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number, a numeric string or null")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            if v.is_empty() {
                Ok(None)
            } else {
                Ok(Some(v.parse().unwrap_or(f64::NAN)))
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(ReadingVisitor)
}
