//! Common types used across the advisor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Soil types offered to growers
///
/// The five named variants are the canonical list; anything else is kept
/// verbatim so the set stays open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SoilType {
    Black,
    Red,
    Clay,
    Alluvial,
    Sandy,
    Other(String),
}

/// Canonical soil type names, in display order
pub const SOIL_TYPES: &[&str] = &["Black", "Red", "Clay", "Alluvial", "Sandy"];

impl SoilType {
    /// Parse a soil type name, case-insensitively. Returns `None` for blank input.
    pub fn parse(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.to_lowercase().as_str() {
            "black" => SoilType::Black,
            "red" => SoilType::Red,
            "clay" => SoilType::Clay,
            "alluvial" => SoilType::Alluvial,
            "sandy" => SoilType::Sandy,
            _ => SoilType::Other(trimmed.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            SoilType::Black => "Black",
            SoilType::Red => "Red",
            SoilType::Clay => "Clay",
            SoilType::Alluvial => "Alluvial",
            SoilType::Sandy => "Sandy",
            SoilType::Other(name) => name,
        }
    }
}

impl From<String> for SoilType {
    fn from(value: String) -> Self {
        SoilType::parse(&value).unwrap_or(SoilType::Other(value))
    }
}

impl From<SoilType> for String {
    fn from(value: SoilType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How organic alternatives are selected from the artifact's table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrganicMode {
    /// Every group in the table, flattened in table order, regardless of crop
    #[default]
    FlattenAll,
    /// Only the group keyed by the predicted crop (lowercase)
    ByCrop,
}
