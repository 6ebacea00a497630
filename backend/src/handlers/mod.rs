//! HTTP request handlers

mod health;
mod model;
mod recommendation;
mod weather;

pub use health::*;
pub use model::*;
pub use recommendation::*;
pub use weather::*;
