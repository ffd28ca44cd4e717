//! Repository Module
//!
//! Read-only queries over the ledger tables. Functions take `&SqlitePool`
//! and return raw aggregates; rounding and business rules live in `analysis`.

pub mod ledger;
pub mod partner;

use shared::error::AppError;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Ledger query failed");
                AppError::database(msg)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
