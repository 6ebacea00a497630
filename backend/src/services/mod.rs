//! Business logic services for the EcoFarm advisor

pub mod advisor;
pub mod inference;

pub use advisor::{Advisor, AdvisoryOutcome, AdvisoryState};
pub use inference::predict_crop;
