//! Recommendation models and composition

use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use crate::models::{SoilSample, WeatherReading};
use crate::types::OrganicMode;

/// Sentinel returned when a lookup table has no entry for a crop
pub const NO_DATA: &str = "No data";

/// Emission factors (kg CO2e per kg of applied nutrient)
const NITROGEN_FACTOR: Decimal = Decimal::from_parts(63, 0, 0, false, 1);
const PHOSPHORUS_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);
const POTASSIUM_FACTOR: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Crop recommendation derived from a single prediction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub crop_label: String,
    pub fertilizers: Vec<String>,
    pub organic_alternatives: Vec<String>,
    pub carbon_estimate_kg_co2e_per_ha: Decimal,
}

/// Full advisory response: inputs, weather snapshot and recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryReport {
    pub request_id: Uuid,
    pub soil: SoilSample,
    pub weather: WeatherReading,
    pub recommendation: Recommendation,
}

/// Ordered string-list lookup table, as shipped in the model artifact
///
/// Entries keep the order they had in the source document, so flattening is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    entries: Vec<(String, Vec<String>)>,
}

impl LookupTable {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    /// Look up a key after lowercasing it
    pub fn get_lowercase(&self, key: &str) -> Option<&[String]> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Every value of every group, in table order
    pub fn flatten(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(_, v)| v.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for LookupTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LookupTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = LookupTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of string to list of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, values)) = access.next_entry::<String, Vec<String>>()? {
                    entries.push((key, values));
                }
                Ok(LookupTable { entries })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Linear emissions estimate: `round(N*6.3 + P*1.5 + K*0.8, 2)` kg CO2e/ha
pub fn carbon_estimate(nitrogen: u16, phosphorus: u16, potassium: u16) -> Decimal {
    (Decimal::from(nitrogen) * NITROGEN_FACTOR
        + Decimal::from(phosphorus) * PHOSPHORUS_FACTOR
        + Decimal::from(potassium) * POTASSIUM_FACTOR)
        .round_dp(2)
}

/// Fertilizer suggestions for a crop, or the `No data` sentinel
pub fn fertilizers_for(crop_label: &str, fertilizer_table: &LookupTable) -> Vec<String> {
    fertilizer_table
        .get_lowercase(crop_label)
        .map(|v| v.to_vec())
        .unwrap_or_else(|| vec![NO_DATA.to_string()])
}

/// Organic alternatives according to the configured selection mode
pub fn organic_alternatives_for(
    crop_label: &str,
    organic_table: &LookupTable,
    mode: OrganicMode,
) -> Vec<String> {
    match mode {
        OrganicMode::FlattenAll => organic_table.flatten(),
        OrganicMode::ByCrop => organic_table
            .get_lowercase(crop_label)
            .map(|v| v.to_vec())
            .unwrap_or_else(|| vec![NO_DATA.to_string()]),
    }
}

/// Map a predicted crop to fertilizer and organic suggestions plus a carbon estimate
pub fn compose(
    crop_label: &str,
    nitrogen: u16,
    phosphorus: u16,
    potassium: u16,
    fertilizer_table: &LookupTable,
    organic_table: &LookupTable,
    organic_mode: OrganicMode,
) -> Recommendation {
    Recommendation {
        crop_label: crop_label.to_string(),
        fertilizers: fertilizers_for(crop_label, fertilizer_table),
        organic_alternatives: organic_alternatives_for(crop_label, organic_table, organic_mode),
        carbon_estimate_kg_co2e_per_ha: carbon_estimate(nitrogen, phosphorus, potassium),
    }
}
