//! Centralized error taxonomy (spec §7), `thiserror`-based with an
//! `IntoResponse` impl so the auth service's axum handlers can return it
//! directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Core application error used across the auth service and shared crates.
#[derive(Debug, thiserror::Error)]
pub enum KeeperError {
    #[error("{field} is required")]
    InvalidArgument { field: String },

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{resource} already exists")]
    AlreadyExists { resource: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("invalid token")]
    InvalidToken,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    error: String,
    message: String,
}

impl KeeperError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::AlreadyExists { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &str {
        match self {
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::InvalidCredentials => "INVALID_ARGUMENT",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Database(_) => "INTERNAL",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for KeeperError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Never leak internals — db/anyhow detail goes to the log, not the client.
        let message = match &self {
            KeeperError::Database(e) => {
                tracing::error!("database error: {e}");
                "an internal error occurred".to_string()
            }
            KeeperError::Internal(e) => {
                tracing::error!("internal error: {e}");
                "an internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            code: status.as_u16(),
            error: self.error_code().to_string(),
            message,
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type KeeperResult<T> = Result<T, KeeperError>;
