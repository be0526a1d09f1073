//! ankr API crate - axum HTTP surface for the action-call pipeline.
//!
//! Action call lifecycle endpoints (create, acknowledge, execute, complete,
//! pump, listing), proposal and chat endpoints, and a health check.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod validation;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::{ApiSettings, AppState};
