//! Domain models for the crop advisor

mod recommendation;
mod soil;
mod weather;

pub use recommendation::*;
pub use soil::*;
pub use weather::*;
