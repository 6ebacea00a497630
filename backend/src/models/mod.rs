//! Model artifact and fitted estimators
//!
//! Re-exports domain models from the shared crate and adds the backend-only
//! model bundle.

mod artifact;
mod classifier;

pub use artifact::{ArtifactError, ArtifactFile, LoadOptions, ModelArtifact};
pub use classifier::{Classifier, LabelEncoder, Scaler, TreeNode};
pub use shared::models::*;
