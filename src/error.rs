use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed input, rejected before it reaches the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique resource already exists (e.g. email collision at registration).
    #[error("Duplicate resource: {0}")]
    Duplicate(String),

    /// Bad credentials or missing/invalid/expired token.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Authenticated but neither resource owner nor admin.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found error.
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!(error = %self, "Request error");

        (status, self.to_string()).into_response()
    }
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
