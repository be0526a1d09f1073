//! Shared types, errors, and configuration for the ankr action-call pipeline.

pub mod config;
pub mod error;
pub mod types;

pub use config::AnkrConfig;
pub use error::{AnkrError, Result};
pub use types::*;
