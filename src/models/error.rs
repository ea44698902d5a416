//! Validation error types for rosterd models
//!
//! This module defines error types specifically for field validation,
//! separate from the general application errors.

use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Main validation error type
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The kind of validation error
    pub kind: ValidationErrorKind,
    /// The field that failed validation
    pub field: String,
    /// Optional additional context
    pub context: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(kind: ValidationErrorKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            context: None,
        }
    }

    /// Create a validation error with additional context
    pub fn with_context(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            context: Some(context.into()),
        }
    }

    /// Human-readable message for API responses (kind only, no context)
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(
                f,
                "Validation failed for field '{}': {} - {}",
                self.field, self.kind, ctx
            ),
            None => write!(
                f,
                "Validation failed for field '{}': {}",
                self.field, self.kind
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Specific validation error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Field is required but missing or blank
    #[error("Required field is missing")]
    Required,

    /// Field value is too short after trimming
    #[error("Value is below minimum length of {min}")]
    TooShort { min: usize },

    /// Field value is too long after trimming
    #[error("Value exceeds maximum length of {max}")]
    TooLong { max: usize },

    /// Field contains characters other than letters and spaces
    #[error("Value must contain only alphabets and spaces")]
    NotAlphabetic,

    /// Value is not a member of the district enumeration
    #[error("District must be selected from the fixed district list")]
    InvalidDistrict,

    /// Contact number is not exactly 10 digits
    #[error("Contact number must be exactly 10 digits")]
    InvalidContactNumber,

    /// Email does not match the local@domain.tld shape
    #[error("Email must be in a valid format")]
    InvalidEmail,

    /// Date could not be parsed
    #[error("Invalid date format (expected YYYY-MM-DD)")]
    InvalidDate,

    /// Birth date is not in the past
    #[error("Birth date must be in the past")]
    DateNotInPast,

    /// Student code does not match the STU_NNNN shape
    #[error("Invalid student code format")]
    InvalidCode,

    /// Custom validation error
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Collection of validation errors accumulated across fields
#[derive(Debug, Default, Clone)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record the error side of a result, passing the success value through
    pub fn collect<T>(&mut self, result: ValidationResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(e);
                None
            }
        }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Check whether a given field has a recorded error
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Convert to a Result
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Render as the wire shape `{ field: { message } }`
    pub fn to_field_map(&self) -> Value {
        let mut map = serde_json::Map::new();
        for error in &self.errors {
            // First error per field wins
            map.entry(error.field.clone())
                .or_insert_with(|| json!({ "message": error.message() }));
        }
        Value::Object(map)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "No validation errors")
        } else {
            write!(f, "Validation failed with {} error(s):", self.errors.len())?;
            for error in &self.errors {
                write!(f, "\n  - {}", error)?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }
}

/// Convert the fail-fast validator-derive output into our error shape
impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut out = Self::new();
        for (field, field_errors) in errs.field_errors() {
            for fe in field_errors {
                let message = fe
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| fe.code.to_string());
                out.add(ValidationError::new(
                    ValidationErrorKind::Custom(message),
                    field.to_string(),
                ));
            }
        }
        out
    }
}
