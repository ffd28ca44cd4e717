//! Data models
//!
//! Shared between analysis-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.

pub mod analysis;
pub mod ledger;

// Re-exports
pub use analysis::*;
pub use ledger::*;
