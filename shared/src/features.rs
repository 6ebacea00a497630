//! Feature engineering for the crop classifier
//!
//! The model artifact names its input features in training order. A
//! [`FeaturePlan`] resolves those names once, at startup, into a list of
//! [`FeatureKind`]s and afterwards turns raw soil and weather readings into
//! the vector the classifier expects.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{SoilSample, WeatherReading};

/// Guard added to the `P + K` denominator of the NPK ratio
pub const NPK_EPSILON: f64 = 1e-6;

/// Raw values every feature is computed from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureInputs {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub ph: f64,
    pub temperature: f64,
    pub rainfall: f64,
}

impl FeatureInputs {
    pub fn new(nitrogen: f64, phosphorus: f64, potassium: f64, ph: f64, temperature: f64, rainfall: f64) -> Self {
        Self {
            nitrogen,
            phosphorus,
            potassium,
            ph,
            temperature,
            rainfall,
        }
    }

    pub fn from_readings(soil: &SoilSample, weather: &WeatherReading) -> Self {
        Self::new(
            f64::from(soil.nitrogen),
            f64::from(soil.phosphorus),
            f64::from(soil.potassium),
            soil.ph,
            weather.temperature_celsius,
            weather.rainfall_mm,
        )
    }

    pub fn total_nutrients(&self) -> f64 {
        self.nitrogen + self.phosphorus + self.potassium
    }

    pub fn npk_ratio(&self) -> f64 {
        npk_ratio(self.nitrogen, self.phosphorus, self.potassium)
    }
}

/// `N / (P + K + ε)`
pub fn npk_ratio(nitrogen: f64, phosphorus: f64, potassium: f64) -> f64 {
    nitrogen / (phosphorus + potassium + NPK_EPSILON)
}

/// Acidity class: 0 for pH <= 5.5, 1 for 5.5 < pH <= 7, 2 above 7
pub fn ph_class(ph: f64) -> u8 {
    if ph <= 5.5 {
        0
    } else if ph <= 7.0 {
        1
    } else {
        2
    }
}

/// A single named model input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Nitrogen,
    Phosphorus,
    Potassium,
    Ph,
    Temperature,
    Rainfall,
    TotalNutrients,
    NpkRatio,
    PhClass,
    /// Placeholder for a name the builder does not know; always 0
    Zero,
}

impl FeatureKind {
    /// Resolve a feature name as written by the training pipeline
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Nitrogen" => FeatureKind::Nitrogen,
            "Phosphorus" => FeatureKind::Phosphorus,
            "Potassium" => FeatureKind::Potassium,
            "pH" => FeatureKind::Ph,
            "Temperature" => FeatureKind::Temperature,
            "Rainfall" => FeatureKind::Rainfall,
            "Total_Nutrients" => FeatureKind::TotalNutrients,
            "NPK_Ratio" => FeatureKind::NpkRatio,
            "pH_Class" => FeatureKind::PhClass,
            _ => return None,
        })
    }

    pub fn evaluate(self, inputs: &FeatureInputs) -> f64 {
        match self {
            FeatureKind::Nitrogen => inputs.nitrogen,
            FeatureKind::Phosphorus => inputs.phosphorus,
            FeatureKind::Potassium => inputs.potassium,
            FeatureKind::Ph => inputs.ph,
            FeatureKind::Temperature => inputs.temperature,
            FeatureKind::Rainfall => inputs.rainfall,
            FeatureKind::TotalNutrients => inputs.total_nutrients(),
            FeatureKind::NpkRatio => inputs.npk_ratio(),
            FeatureKind::PhClass => f64::from(ph_class(inputs.ph)),
            FeatureKind::Zero => 0.0,
        }
    }
}

/// Feature plan errors
#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("model requests unrecognised features: {}", .0.join(", "))]
    UnknownFeatures(Vec<String>),

    #[error("model declares no features")]
    Empty,
}

/// Feature names resolved against the builder, in model order
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturePlan {
    names: Vec<String>,
    kinds: Vec<FeatureKind>,
}

impl FeaturePlan {
    /// Resolve every name, failing if any is unrecognised
    pub fn compile(names: &[String]) -> Result<Self, FeatureError> {
        let (plan, unknown) = Self::compile_lenient(names)?;
        if !unknown.is_empty() {
            return Err(FeatureError::UnknownFeatures(unknown));
        }
        Ok(plan)
    }

    /// Resolve names, mapping unrecognised ones to a constant zero.
    ///
    /// Returns the plan and the names that were zero-filled.
    pub fn compile_lenient(names: &[String]) -> Result<(Self, Vec<String>), FeatureError> {
        if names.is_empty() {
            return Err(FeatureError::Empty);
        }
        let mut unknown = Vec::new();
        let kinds = names
            .iter()
            .map(|name| {
                FeatureKind::from_name(name).unwrap_or_else(|| {
                    unknown.push(name.clone());
                    FeatureKind::Zero
                })
            })
            .collect();
        Ok((
            Self {
                names: names.to_vec(),
                kinds,
            },
            unknown,
        ))
    }

    pub fn build(&self, inputs: &FeatureInputs) -> Vec<f64> {
        self.kinds.iter().map(|kind| kind.evaluate(inputs)).collect()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Build a feature vector in `feature_order`, zero-filling unknown names.
///
/// One-off form of [`FeaturePlan::build`]. Unknown names are logged.
pub fn build_features(
    nitrogen: f64,
    phosphorus: f64,
    potassium: f64,
    ph: f64,
    temperature: f64,
    rainfall: f64,
    feature_order: &[String],
) -> Vec<f64> {
    let inputs = FeatureInputs::new(nitrogen, phosphorus, potassium, ph, temperature, rainfall);
    feature_order
        .iter()
        .map(|name| match FeatureKind::from_name(name) {
            Some(kind) => kind.evaluate(&inputs),
            None => {
                tracing::warn!(feature = %name, "unrecognised feature name, emitting 0");
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn all_features() -> Vec<String> {
        names(&[
            "Nitrogen",
            "Phosphorus",
            "Potassium",
            "pH",
            "Temperature",
            "Rainfall",
            "Total_Nutrients",
            "NPK_Ratio",
            "pH_Class",
        ])
    }

    #[test]
    fn ph_class_boundaries() {
        assert_eq!(ph_class(0.0), 0);
        assert_eq!(ph_class(5.5), 0);
        assert_eq!(ph_class(5.500001), 1);
        assert_eq!(ph_class(7.0), 1);
        assert_eq!(ph_class(7.000001), 2);
        assert_eq!(ph_class(14.0), 2);
    }

    #[test]
    fn npk_ratio_guards_zero_denominator() {
        let ratio = npk_ratio(0.0, 0.0, 0.0);
        assert!(ratio.is_finite());
        assert!(ratio.abs() < 1e-12);
    }

    #[test]
    fn reference_scenario() {
        let vector = build_features(90.0, 40.0, 40.0, 6.5, 25.0, 100.0, &all_features());
        assert_eq!(vector.len(), 9);
        assert_eq!(&vector[..6], &[90.0, 40.0, 40.0, 6.5, 25.0, 100.0]);
        assert_eq!(vector[6], 170.0);
        assert!((vector[7] - 90.0 / 80.000001).abs() < 1e-12);
        assert!((vector[7] - 1.125).abs() < 1e-6);
        assert_eq!(vector[8], 1.0);
    }

    #[test]
    fn order_follows_feature_list() {
        let order = names(&["pH_Class", "Rainfall", "Nitrogen"]);
        let vector = build_features(10.0, 20.0, 30.0, 7.5, 18.0, 3.0, &order);
        assert_eq!(vector, vec![2.0, 3.0, 10.0]);
    }

    #[test]
    fn unknown_feature_emits_zero() {
        let order = names(&["Nitrogen", "Humidity"]);
        let vector = build_features(10.0, 20.0, 30.0, 6.0, 18.0, 3.0, &order);
        assert_eq!(vector, vec![10.0, 0.0]);
    }

    #[test]
    fn strict_plan_rejects_unknown_names() {
        let err = FeaturePlan::compile(&names(&["Nitrogen", "Humidity", "Moisture"])).unwrap_err();
        assert_eq!(
            err,
            FeatureError::UnknownFeatures(names(&["Humidity", "Moisture"]))
        );
        assert!(err.to_string().contains("Humidity, Moisture"));
    }

    #[test]
    fn lenient_plan_zero_fills_unknown_names() {
        let (plan, unknown) = FeaturePlan::compile_lenient(&names(&["Humidity", "pH"])).unwrap();
        assert_eq!(unknown, names(&["Humidity"]));
        assert_eq!(plan.len(), 2);
        let inputs = FeatureInputs::new(1.0, 2.0, 3.0, 6.8, 20.0, 0.0);
        assert_eq!(plan.build(&inputs), vec![0.0, 6.8]);
    }

    #[test]
    fn empty_feature_list_is_rejected() {
        assert_eq!(FeaturePlan::compile(&[]).unwrap_err(), FeatureError::Empty);
    }

    #[test]
    fn plan_matches_one_off_builder() {
        let plan = FeaturePlan::compile(&all_features()).unwrap();
        let inputs = FeatureInputs::new(90.0, 40.0, 40.0, 6.5, 25.0, 100.0);
        assert_eq!(
            plan.build(&inputs),
            build_features(90.0, 40.0, 40.0, 6.5, 25.0, 100.0, &all_features())
        );
    }

    fn feature_name_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Nitrogen".to_string()),
            Just("Phosphorus".to_string()),
            Just("Potassium".to_string()),
            Just("pH".to_string()),
            Just("Temperature".to_string()),
            Just("Rainfall".to_string()),
            Just("Total_Nutrients".to_string()),
            Just("NPK_Ratio".to_string()),
            Just("pH_Class".to_string()),
            "[a-z]{3,8}",
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn vector_length_matches_feature_list(
            order in prop::collection::vec(feature_name_strategy(), 0..20),
            n in 0u16..=300,
            p in 0u16..=300,
            k in 0u16..=300,
            ph in 0.0f64..=14.0,
            temp in -10.0f64..50.0,
            rain in 0.0f64..200.0,
        ) {
            let vector = build_features(
                f64::from(n), f64::from(p), f64::from(k), ph, temp, rain, &order,
            );
            prop_assert_eq!(vector.len(), order.len());
            prop_assert!(vector.iter().all(|v| v.is_finite()));
        }

        #[test]
        fn ph_class_is_monotone(a in 0.0f64..=14.0, b in 0.0f64..=14.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ph_class(lo) <= ph_class(hi));
        }
    }
}
