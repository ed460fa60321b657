//! HTTP handlers for the attractions service.

pub mod attractions;
pub mod health;

pub use attractions::get_attractions;
pub use health::{health_check, readiness_check, root};
