//! The single mapping from domain and auth failures to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::common::{AuthError, DomainError};

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            ApiError::Unauthorized(detail)
            | ApiError::Forbidden(detail)
            | ApiError::NotFound(detail)
            | ApiError::BadRequest(detail) => detail,
            ApiError::Internal(_) => "Internal server error",
        }
    }

    fn internal(err: impl std::fmt::Display) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DomainError::Forbidden(_) | DomainError::InvalidTransition { .. } => {
                ApiError::Forbidden(err.to_string())
            }
            DomainError::Validation(_) => ApiError::BadRequest(err.to_string()),
            DomainError::Database(_) | DomainError::Internal(_) => ApiError::internal(err),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired
            | AuthError::InvalidToken
            | AuthError::AccountDisabled => ApiError::Unauthorized(err.to_string()),
            AuthError::PermissionDenied => ApiError::Forbidden(err.to_string()),
            AuthError::DatabaseError(_) | AuthError::InternalError(_) => ApiError::internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(message) = &self {
            tracing::error!(error = %message, "request failed");
        }
        let status = self.status();
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
