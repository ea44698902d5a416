//! Error handling module for rosterd
//!
//! This module defines the error types used throughout the application,
//! providing a unified error handling strategy with proper error context
//! and HTTP response mapping. Duplicate conflicts are reported per colliding
//! field so callers can regenerate-and-retry (`code`) or inform the user
//! (`email`).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::{ValidationError, ValidationErrors};

/// Result type alias for rosterd operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rosterd
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(String),

    /// Field validation failures, one or more fields
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Uniqueness violation on the generated student code
    #[error("Student code already exists: {0}")]
    DuplicateCode(String),

    /// Uniqueness violation on a supplied email
    #[error("Email already exists: {0}")]
    DuplicateEmail(String),

    /// Operation referenced a nonexistent record
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a database error
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Error::Database(msg.into())
    }

    /// Create a not-found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateCode(_) | Error::DuplicateEmail(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Config(_)
            | Error::Database(_)
            | Error::Serialization(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if the caller may retry the triggering operation
    ///
    /// A duplicate-code conflict is an expected race between concurrent
    /// creates; regenerating the code and resubmitting is the correct
    /// response. A duplicate email is a true user error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::DuplicateCode(_) | Error::Database(_))
    }
}

/// Implement IntoResponse for automatic error responses in Axum
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Error::Validation(errors) => Json(json!({
                "message": "Validation failed",
                "errors": errors.to_field_map(),
            })),
            Error::DuplicateCode(_) => Json(json!({
                "message": "Student code already exists",
                "errors": { "code": { "message": "This student code is already in use" } },
            })),
            Error::DuplicateEmail(_) => Json(json!({
                "message": "Email already exists",
                "errors": { "email": { "message": "This email is already registered" } },
            })),
            Error::NotFound(msg) => Json(json!({ "message": msg })),
            // Internal detail stays in the logs, not the response
            _ => Json(json!({ "message": "Server error" })),
        };

        // Log error based on severity
        match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = ?self, error_type = error_type(&self), "Internal server error");
            }
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::CONFLICT => {
                tracing::warn!(error = ?self, error_type = error_type(&self), "Client error");
            }
            _ => {
                tracing::info!(error = ?self, "Request error");
            }
        }

        (status, body).into_response()
    }
}

/// Get a string representation of the error type
fn error_type(error: &Error) -> &'static str {
    match error {
        Error::Config(_) => "configuration_error",
        Error::Database(_) => "database_error",
        Error::Validation(_) => "validation_error",
        Error::DuplicateCode(_) => "duplicate_code",
        Error::DuplicateEmail(_) => "duplicate_email",
        Error::NotFound(_) => "not_found",
        Error::Serialization(_) => "serialization_error",
        Error::Io(_) => "io_error",
        Error::Internal(_) => "internal_error",
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Error::Validation(error.into())
    }
}

/// Convert from anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

/// Convert from envconfig::Error to our Error type
impl From<envconfig::Error> for Error {
    fn from(err: envconfig::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ValidationError, ValidationErrorKind};

    #[test]
    fn test_error_status_codes() {
        let errors: ValidationErrors =
            ValidationError::new(ValidationErrorKind::Required, "firstName").into();
        assert_eq!(
            Error::Validation(errors).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::DuplicateCode("STU_0001".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::DuplicateEmail("a@b.lk".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::NotFound("test".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::internal("test").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_retryable() {
        assert!(Error::DuplicateCode("STU_0001".to_string()).is_retryable());
        assert!(Error::database("test").is_retryable());
        assert!(!Error::DuplicateEmail("a@b.lk".to_string()).is_retryable());
        assert!(!Error::NotFound("test".to_string()).is_retryable());
    }
}
