//! Shared types for the analysis engine
//!
//! Error types, response structures and the analysis wire models used by
//! the server and its clients.

pub mod error;
pub mod models;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
