// src/error.rs
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::models::leave::LeaveStatus;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] std::env::VarError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // Persisted JSON that no longer parses. Startup aborts on this.
    #[error("Corrupt persisted state under key '{key}': {source}")]
    CorruptState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Error while processing password")]
    PasswordHashingError,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Leave request {id} is already {status}")]
    InvalidLeaveTransition { id: i64, status: LeaveStatus },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unexpected internal error")]
    InternalServerError,

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
            }
            AppError::EnvVarError(_) | AppError::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error")
            }
            AppError::CorruptState { .. } | AppError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "state_error")
            }
            AppError::PasswordHashingError => (StatusCode::INTERNAL_SERVER_ERROR, "password_error"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::SessionError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "session_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::InvalidLeaveTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::InternalServerError => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        }
    }
}

// How an AppError becomes an HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = self.status_and_code();

        // Server-side failures are logged in full, client errors only briefly
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        // Internal details never leave the server
        let message = if status.is_server_error() {
            "An unexpected error occurred.".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

// Default Result type for the application
pub type AppResult<T = ()> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let response = AppError::NotFound("Leave request 9".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::InvalidLeaveTransition { id: 3, status: LeaveStatus::Resolved }
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn corrupt_state_is_a_server_error() {
        let source = serde_json::from_str::<Vec<i64>>("{not json").unwrap_err();
        let err = AppError::CorruptState { key: "attendify-teachers".into(), source };
        assert!(err.to_string().contains("attendify-teachers"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
