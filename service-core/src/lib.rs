//! service-core: Shared infrastructure for the atelier services.
pub mod config;
pub mod error;
pub mod observability;

pub use axum;
pub use serde;
pub use tracing;
pub use validator;
