use thiserror::Error;

use super::auth::AuthError;

/// Errors raised by domain actions.
///
/// Each variant maps onto exactly one HTTP status in `server::error`.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("Cannot {action} a ticket in status {status}")]
    InvalidTransition {
        action: &'static str,
        status: &'static str,
    },

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DatabaseError(e) => Self::Database(e),
            AuthError::InternalError(e) => Self::Internal(e),
            other => Self::Forbidden(other.to_string()),
        }
    }
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
