use axum::{http::StatusCode, response::IntoResponse};
use missive_types::ValidationErrors;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

pub const MISSING_CREDENTIAL_MESSAGE: &str = "Missing Authorization token";
pub const INVALID_CREDENTIAL_MESSAGE: &str = "Invalid token provided";
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid email or credential";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Request body is too large";

/// Application error type
///
/// Every variant maps to one HTTP status and one client-facing message. The
/// response body is always `{"error": {"message": "..."}}`.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Authentication & Authorization Errors =====
    #[error("missing Authorization header")]
    MissingCredential,

    #[error("bearer token did not resolve to a user")]
    InvalidCredential,

    #[error("email/credential pair did not match an account")]
    InvalidLogin,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // ===== Lookup & Validation Errors =====
    #[error("Not found: {0}")]
    NotFound(String),

    /// Joined validation reasons, without the `Validation failed` prefix
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    // ===== Database & Storage Errors =====
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // ===== Configuration Errors =====
    #[error("Configuration error: {0}")]
    Config(String),

    // ===== Internal Server Errors =====
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unknown error: {0}")]
    Unknown(#[from] anyhow::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingCredential | AppError::InvalidCredential | AppError::InvalidLogin => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            #[cfg(feature = "database")]
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) | AppError::Internal(_) | AppError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a user-friendly error message (without sensitive details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingCredential => MISSING_CREDENTIAL_MESSAGE.to_string(),
            AppError::InvalidCredential => INVALID_CREDENTIAL_MESSAGE.to_string(),
            AppError::InvalidLogin => INVALID_LOGIN_MESSAGE.to_string(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => format!("Validation failed: {}", msg),
            AppError::PayloadTooLarge => PAYLOAD_TOO_LARGE_MESSAGE.to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    /// Get error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingCredential => "MISSING_CREDENTIAL",
            AppError::InvalidCredential => "INVALID_CREDENTIAL",
            AppError::InvalidLogin => "INVALID_LOGIN",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = %code,
                status = %status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                error = %self,
                error_code = %code,
                "Authentication failed"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = %code,
                status = %status.as_u16(),
                "Client error occurred"
            );
        }
    }

    /// JSON body sent to the client
    pub fn body(&self) -> serde_json::Value {
        json!({
            "error": {
                "message": self.user_message(),
            }
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();
        (self.status_code(), axum::Json(self.body())).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors.joined())
    }
}

// ============================================================================
// Helper functions for creating common errors
// ============================================================================

impl AppError {
    /// Create a validation error from a single reason
    pub fn validation(reason: impl Into<String>) -> Self {
        AppError::Validation(reason.into())
    }

    /// Create a not-found error naming the missing record
    pub fn not_found(record: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("Couldn't find {} with 'id'={}", record, id))
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    /// Create an internal server error
    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
