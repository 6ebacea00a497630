//! Inference engine: scaler, classifier and label decoder

use crate::error::{AppError, AppResult};
use crate::models::ModelArtifact;

/// Predict a crop label for one feature vector
///
/// Deterministic for a given artifact and input. A vector of the wrong width
/// or a class index the label encoder cannot decode means the artifact is
/// corrupt; both are reported as `ArtifactConsistency` errors.
pub fn predict_crop(features: &[f64], artifact: &ModelArtifact) -> AppResult<String> {
    let expected = artifact.feature_plan().len();
    if features.len() != expected {
        return Err(AppError::ArtifactConsistency(format!(
            "feature vector has {} values but the model expects {}",
            features.len(),
            expected
        )));
    }

    let scaled = artifact.scaler().transform(features);
    let class_index = artifact.classifier().predict(&scaled).ok_or_else(|| {
        AppError::ArtifactConsistency("classifier produced no class scores".to_string())
    })?;

    let encoder = artifact.label_encoder();
    encoder
        .decode(class_index)
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::ArtifactConsistency(format!(
                "class index {} outside label vocabulary of {} classes",
                class_index,
                encoder.len()
            ))
        })
}
