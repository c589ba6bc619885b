//! Error types for service operations.
//!
//! Domain outcomes that callers must handle (not found, declined deletes,
//! bad input) are variants here rather than panics or ad-hoc strings, so
//! the HTTP layer can map each to a status code.

use thiserror::Error;

use crate::db::DbError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Delete declined because demands still reference the account.
    #[error("Account {id} has {count} linked demand(s) and cannot be deleted")]
    AccountInUse { id: String, count: i64 },

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// True when the error is the caller's fault rather than ours.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::NotFound { .. } | AppError::Validation(_) | AppError::AccountInUse { .. }
        )
    }
}
