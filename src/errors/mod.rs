//! Error handling module for the BioPage backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const WEAK_PASSWORD: &str = "WEAK_PASSWORD";
    pub const ALREADY_REGISTERED: &str = "ALREADY_REGISTERED";
    pub const EMAIL_NOT_CONFIRMED: &str = "EMAIL_NOT_CONFIRMED";
    pub const NO_RECOVERY_SESSION: &str = "NO_RECOVERY_SESSION";
    pub const INVALID_TOKEN: &str = "INVALID_TOKEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const USERNAME_TAKEN: &str = "USERNAME_TAKEN";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
    pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Minimum password length accepted on sign-up and password update.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Authentication failures, surfaced verbatim to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Password must be at least {} characters", MIN_PASSWORD_LEN)]
    WeakPassword,
    #[error("An account with this email already exists")]
    AlreadyRegistered,
    #[error("Email address has not been confirmed")]
    EmailNotConfirmed,
    #[error("No active password recovery session")]
    NoActiveRecoverySession,
    #[error("Token is invalid or has expired")]
    InvalidToken,
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication provider rejected the request
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Missing or invalid bearer token
    #[error("{0}")]
    Unauthorized(String),
    /// Resource not found
    #[error("{0}")]
    NotFound(String),
    /// Username uniqueness violation on profile save
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),
    /// Validation error
    #[error("{0}")]
    Validation(String),
    /// Store or provider could not be reached; safe to retry manually
    #[error("{0}")]
    ServiceUnavailable(String),
    /// Upload exceeds the configured limit
    #[error("{0}")]
    PayloadTooLarge(String),
    /// Bad request
    #[error("{0}")]
    BadRequest(String),
    /// Internal server error
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(auth) => match auth {
                AuthError::InvalidCredentials | AuthError::NoActiveRecoverySession => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::WeakPassword | AuthError::InvalidToken => StatusCode::BAD_REQUEST,
                AuthError::AlreadyRegistered => StatusCode::CONFLICT,
                AuthError::EmailNotConfirmed => StatusCode::FORBIDDEN,
            },
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UsernameTaken(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(auth) => match auth {
                AuthError::InvalidCredentials => codes::INVALID_CREDENTIALS,
                AuthError::WeakPassword => codes::WEAK_PASSWORD,
                AuthError::AlreadyRegistered => codes::ALREADY_REGISTERED,
                AuthError::EmailNotConfirmed => codes::EMAIL_NOT_CONFIRMED,
                AuthError::NoActiveRecoverySession => codes::NO_RECOVERY_SESSION,
                AuthError::InvalidToken => codes::INVALID_TOKEN,
            },
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::UsernameTaken(_) => codes::USERNAME_TAKEN,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::ServiceUnavailable(_) => codes::SERVICE_UNAVAILABLE,
            AppError::PayloadTooLarge(_) => codes::PAYLOAD_TOO_LARGE,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            other => {
                tracing::error!("Database error: {:?}", other);
                AppError::ServiceUnavailable("Data store unavailable".to_string())
            }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Storage error: {:?}", err);
        AppError::ServiceUnavailable("Storage unavailable".to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
