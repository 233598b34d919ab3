use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// Null/blank required field in a request payload.
    Validation(String),
    /// The caller's resolved account does not exist (stale identity).
    AccountNotFound(String),
    /// A requested entry or account does not exist.
    NotFound(String),
    /// Username already taken.
    Conflict(String),
    /// Unexpected failure during a save/delete protocol; carries the cause.
    InvalidOperation(String),
    Database(sqlx::Error),
}

impl AppError {
    /// Wrap a store-level failure with the operation that hit it.
    pub fn invalid_op(context: &str, cause: impl fmt::Display) -> Self {
        AppError::InvalidOperation(format!("{context}: {cause}"))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "validation failed: {msg}"),
            AppError::AccountNotFound(msg) => write!(f, "account not found: {msg}"),
            AppError::NotFound(msg) => write!(f, "not found: {msg}"),
            AppError::Conflict(msg) => write!(f, "conflict: {msg}"),
            AppError::InvalidOperation(msg) => write!(f, "operation failed: {msg}"),
            AppError::Database(e) => write!(f, "database error: {e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => {
                tracing::warn!(error_type = "validation", message = %msg, "Responding with 400");
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::AccountNotFound(msg) => {
                tracing::warn!(error_type = "account_not_found", message = %msg, "Responding with 401");
                (StatusCode::UNAUTHORIZED, msg)
            }
            AppError::NotFound(msg) => {
                tracing::warn!(error_type = "not_found", message = %msg, "Responding with 404");
                (StatusCode::NOT_FOUND, msg)
            }
            AppError::Conflict(msg) => {
                tracing::warn!(error_type = "conflict", message = %msg, "Responding with 409");
                (StatusCode::CONFLICT, msg)
            }
            AppError::InvalidOperation(msg) => {
                tracing::error!(error_type = "invalid_operation", message = %msg, "Responding with 500");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!(error_type = "database", error = %e, "Responding with 500");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}
