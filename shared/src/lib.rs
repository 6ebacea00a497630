//! Shared types and models for the EcoFarm crop advisor
//!
//! This crate holds the I/O-free parts of the advisory pipeline: input
//! validation, feature engineering and recommendation composition. The
//! backend wires them to the model artifact and the weather provider.

pub mod features;
pub mod models;
pub mod types;
pub mod validation;

pub use features::*;
pub use models::*;
pub use types::*;
pub use validation::*;
