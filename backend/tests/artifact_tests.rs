//! Model artifact and inference tests against the shipped demo artifact

mod common;

use common::{demo_artifact, demo_artifact_path};
use ecofarm_advisor_backend::models::{ArtifactError, LoadOptions, ModelArtifact};
use ecofarm_advisor_backend::services::predict_crop;
use proptest::prelude::*;
use shared::{build_features, FeatureInputs, OrganicMode};

fn predict(n: f64, p: f64, k: f64, ph: f64, temperature: f64, rainfall: f64) -> String {
    let artifact = demo_artifact();
    let features = artifact
        .feature_plan()
        .build(&FeatureInputs::new(n, p, k, ph, temperature, rainfall));
    predict_crop(&features, &artifact).unwrap()
}

#[test]
fn demo_artifact_is_consistent() {
    let artifact = demo_artifact();
    assert_eq!(artifact.feature_names().len(), 9);
    assert_eq!(artifact.label_encoder().len(), 4);
    assert_eq!(artifact.fertilizer_map().len(), 4);
}

#[test]
fn demo_artifact_supports_crop_keyed_lookups_only_for_fertilizers() {
    // organic alternatives are grouped by nutrient, not crop
    let options = LoadOptions {
        strict_features: true,
        organic_mode: OrganicMode::ByCrop,
    };
    assert!(matches!(
        ModelArtifact::load(demo_artifact_path(), options),
        Err(ArtifactError::Inconsistent(_))
    ));
}

#[test]
fn reference_sample_predicts_maize() {
    assert_eq!(predict(90.0, 40.0, 40.0, 6.5, 25.0, 100.0), "maize");
}

#[test]
fn heavy_rain_predicts_rice() {
    assert_eq!(predict(90.0, 40.0, 40.0, 6.5, 25.0, 300.0), "rice");
}

#[test]
fn plan_matches_free_function_builder() {
    let artifact = demo_artifact();
    let from_plan = artifact
        .feature_plan()
        .build(&FeatureInputs::new(90.0, 40.0, 40.0, 6.5, 25.0, 100.0));
    let from_names = build_features(90.0, 40.0, 40.0, 6.5, 25.0, 100.0, artifact.feature_names());
    assert_eq!(from_plan, from_names);
    assert_eq!(from_plan[6], 170.0);
    assert!((from_plan[7] - 1.125).abs() < 1e-6);
    assert_eq!(from_plan[8], 1.0);
}

proptest! {
    /// Every valid input decodes to a crop the artifact knows
    #[test]
    fn prop_predictions_stay_in_vocabulary(
        n in 0u16..=300,
        p in 0u16..=300,
        k in 0u16..=300,
        ph in 0.0f64..=14.0,
        temperature in -10.0f64..50.0,
        rainfall in 0.0f64..400.0,
    ) {
        let crop = predict(n.into(), p.into(), k.into(), ph, temperature, rainfall);
        prop_assert!(["chickpea", "cotton", "maize", "rice"].contains(&crop.as_str()));
    }
}
