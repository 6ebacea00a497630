//! Model artifact loading
//!
//! The artifact is a single JSON bundle produced by the offline training
//! pipeline. It is loaded and checked once at startup and is read-only
//! afterwards; a missing, malformed or inconsistent file stops the server.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::{FeatureError, FeaturePlan, LookupTable, OrganicMode};
use thiserror::Error;

use super::classifier::{Classifier, LabelEncoder, Scaler};

/// Errors raised while loading the artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Features(#[from] FeatureError),

    #[error("inconsistent model artifact: {0}")]
    Inconsistent(String),
}

/// On-disk layout of the artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub features: Vec<String>,
    pub scaler: Scaler,
    pub classifier: Classifier,
    pub label_encoder: LabelEncoder,
    pub fertilizer_map: LookupTable,
    pub organic_alts: LookupTable,
}

/// How the loader treats the artifact's feature list
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Reject unknown feature names instead of zero-filling them
    pub strict_features: bool,
    /// Organic alternatives keyed by crop must match the encoder vocabulary
    pub organic_mode: OrganicMode,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            strict_features: true,
            organic_mode: OrganicMode::FlattenAll,
        }
    }
}

/// Immutable, validated model bundle
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    plan: FeaturePlan,
    scaler: Scaler,
    classifier: Classifier,
    label_encoder: LabelEncoder,
    fertilizer_map: LookupTable,
    organic_alts: LookupTable,
}

impl ModelArtifact {
    /// Load and validate an artifact file
    pub fn load(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact = Self::from_json_str(&raw, options)?;
        tracing::info!(
            path = %path.display(),
            features = artifact.plan.len(),
            classes = artifact.label_encoder.len(),
            "Model artifact loaded"
        );
        Ok(artifact)
    }

    pub fn from_json_str(raw: &str, options: LoadOptions) -> Result<Self, ArtifactError> {
        let file: ArtifactFile = serde_json::from_str(raw)?;
        Self::from_file(file, options)
    }

    /// Validate a deserialized artifact
    pub fn from_file(file: ArtifactFile, options: LoadOptions) -> Result<Self, ArtifactError> {
        let plan = if options.strict_features {
            FeaturePlan::compile(&file.features)?
        } else {
            let (plan, unknown) = FeaturePlan::compile_lenient(&file.features)?;
            if !unknown.is_empty() {
                tracing::warn!(
                    features = ?unknown,
                    "Model requests unrecognised features; they will be fed as 0"
                );
            }
            plan
        };

        let artifact = Self {
            plan,
            scaler: file.scaler,
            classifier: file.classifier,
            label_encoder: file.label_encoder,
            fertilizer_map: file.fertilizer_map,
            organic_alts: file.organic_alts,
        };
        artifact.check_consistency(options.organic_mode)?;
        Ok(artifact)
    }

    fn check_consistency(&self, organic_mode: OrganicMode) -> Result<(), ArtifactError> {
        let n_features = self.plan.len();
        let n_classes = self.label_encoder.len();
        let inconsistent = ArtifactError::Inconsistent;

        if n_classes == 0 {
            return Err(inconsistent("label encoder has no classes".to_string()));
        }
        self.scaler.validate().map_err(inconsistent)?;
        if let Some(dim) = self.scaler.dimension() {
            if dim != n_features {
                return Err(inconsistent(format!(
                    "scaler was fitted on {} features but the model lists {}",
                    dim, n_features
                )));
            }
        }
        self.classifier
            .validate(n_features, n_classes)
            .map_err(inconsistent)?;

        self.check_vocabulary("fertilizer", &self.fertilizer_map)?;
        if organic_mode == OrganicMode::ByCrop {
            self.check_vocabulary("organic alternatives", &self.organic_alts)?;
        }
        Ok(())
    }

    /// Table keys must be lowercase crop names; lookups lowercase the predicted label
    fn check_vocabulary(&self, table_name: &str, table: &LookupTable) -> Result<(), ArtifactError> {
        let not_lowercase: Vec<&str> = table
            .keys()
            .filter(|key| *key != key.to_lowercase())
            .collect();
        if !not_lowercase.is_empty() {
            return Err(ArtifactError::Inconsistent(format!(
                "{} table keys must be lowercase: {}",
                table_name,
                not_lowercase.join(", ")
            )));
        }

        let unknown: Vec<&str> = table
            .keys()
            .filter(|key| !self.label_encoder.contains_ignore_case(key))
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ArtifactError::Inconsistent(format!(
                "{} table has crops the label encoder does not know: {}",
                table_name,
                unknown.join(", ")
            )))
        }
    }

    /// Build an artifact without consistency checks, to exercise runtime guards
    #[cfg(test)]
    pub(crate) fn unchecked(file: ArtifactFile) -> Self {
        let (plan, _) = FeaturePlan::compile_lenient(&file.features).expect("non-empty features");
        Self {
            plan,
            scaler: file.scaler,
            classifier: file.classifier,
            label_encoder: file.label_encoder,
            fertilizer_map: file.fertilizer_map,
            organic_alts: file.organic_alts,
        }
    }

    pub fn feature_plan(&self) -> &FeaturePlan {
        &self.plan
    }

    pub fn feature_names(&self) -> &[String] {
        self.plan.names()
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.label_encoder
    }

    pub fn fertilizer_map(&self) -> &LookupTable {
        &self.fertilizer_map
    }

    pub fn organic_alts(&self) -> &LookupTable {
        &self.organic_alts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> serde_json::Value {
        json!({
            "features": ["Nitrogen", "pH"],
            "scaler": {"kind": "standard", "mean": [50.0, 6.5], "scale": [25.0, 1.0]},
            "classifier": {"kind": "decision_tree", "tree": {"split": {
                "feature": 0, "threshold": 0.0,
                "left": {"leaf": {"value": [3, 1]}},
                "right": {"leaf": {"value": [0, 4]}}
            }}},
            "label_encoder": {"classes": ["lentil", "rice"]},
            "fertilizer_map": {"rice": ["Urea"], "lentil": ["SSP"]},
            "organic_alts": {"nitrogen": ["Compost"]}
        })
    }

    fn load(value: serde_json::Value, options: LoadOptions) -> Result<ModelArtifact, ArtifactError> {
        ModelArtifact::from_json_str(&value.to_string(), options)
    }

    #[test]
    fn loads_consistent_artifact() {
        let artifact = load(base(), LoadOptions::default()).unwrap();
        assert_eq!(artifact.feature_names(), &["Nitrogen", "pH"]);
        assert_eq!(artifact.label_encoder().len(), 2);
        assert_eq!(artifact.fertilizer_map().len(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ModelArtifact::load("/nonexistent/crop_model.json", LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }

    #[test]
    fn missing_lookup_table_is_malformed() {
        let mut value = base();
        value.as_object_mut().unwrap().remove("fertilizer_map");
        assert!(matches!(
            load(value, LoadOptions::default()),
            Err(ArtifactError::Parse(_))
        ));
    }

    #[test]
    fn strict_mode_rejects_unknown_features() {
        let mut value = base();
        value["features"] = json!(["Nitrogen", "Humidity"]);
        assert!(matches!(
            load(value, LoadOptions::default()),
            Err(ArtifactError::Features(FeatureError::UnknownFeatures(_)))
        ));
    }

    #[test]
    fn lenient_mode_zero_fills_unknown_features() {
        let mut value = base();
        value["features"] = json!(["Nitrogen", "Humidity"]);
        let options = LoadOptions {
            strict_features: false,
            ..LoadOptions::default()
        };
        let artifact = load(value, options).unwrap();
        assert_eq!(artifact.feature_plan().len(), 2);
    }

    #[test]
    fn scaler_dimension_must_match_features() {
        let mut value = base();
        value["scaler"] = json!({"kind": "standard", "mean": [1.0], "scale": [1.0]});
        assert!(matches!(
            load(value, LoadOptions::default()),
            Err(ArtifactError::Inconsistent(_))
        ));
    }

    #[test]
    fn fertilizer_keys_must_be_known_crops() {
        let mut value = base();
        value["fertilizer_map"] = json!({"rice": ["Urea"], "wheat": ["DAP"]});
        let err = load(value, LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("wheat"));
        assert!(!err.to_string().contains("rice"));
    }

    #[test]
    fn mixed_case_fertilizer_keys_are_rejected() {
        // lookups lowercase the label, so "Rice" could never be reached
        let mut value = base();
        value["label_encoder"] = json!({"classes": ["lentil", "Rice"]});
        value["fertilizer_map"] = json!({"Rice": ["Urea"], "lentil": ["SSP"]});
        let err = load(value, LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ArtifactError::Inconsistent(_)));
        assert!(err.to_string().contains("lowercase: Rice"));
    }

    #[test]
    fn capitalised_class_matches_lowercase_key() {
        let mut value = base();
        value["label_encoder"] = json!({"classes": ["lentil", "Rice"]});
        let artifact = load(value, LoadOptions::default()).unwrap();
        assert_eq!(
            artifact.fertilizer_map().get_lowercase("Rice"),
            Some(&["Urea".to_string()][..])
        );
    }

    #[test]
    fn organic_keys_checked_only_when_keyed_by_crop() {
        let flatten = LoadOptions::default();
        assert!(load(base(), flatten).is_ok());

        let by_crop = LoadOptions {
            organic_mode: OrganicMode::ByCrop,
            ..LoadOptions::default()
        };
        assert!(matches!(
            load(base(), by_crop),
            Err(ArtifactError::Inconsistent(_))
        ));
    }
}
