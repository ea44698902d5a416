//! Repository pattern abstractions for rosterd
//!
//! This module defines the repository trait and associated error types
//! for database operations with proper error handling and retry logic.
//! Unique-constraint violations carry which field collided so callers can
//! regenerate-and-retry a code conflict but reject an email conflict.

use async_trait::async_trait;

use std::fmt::Debug;
use thiserror::Error;

use crate::models::ValidationErrors;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Name of the unique index on the student code column
pub const CODE_CONSTRAINT: &str = "students_code_key";
/// Name of the partial unique index on the email column
pub const EMAIL_CONSTRAINT: &str = "students_email_key";

/// Which unique field a duplicate-key violation hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Code,
    Email,
}

impl DuplicateField {
    /// Wire-facing field name
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateField::Code => "code",
            DuplicateField::Email => "email",
        }
    }
}

/// Repository error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query execution error: {0}")]
    QueryExecution(String),

    /// Entity not found
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Uniqueness violation on a known field
    #[error("Duplicate value for unique field '{}'", .0.as_str())]
    Duplicate(DuplicateField),

    /// Record failed the field rules at the storage boundary
    #[error("Record rejected by storage validation: {0}")]
    Invalid(ValidationErrors),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Pool exhausted
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            RepositoryError::Connection(_)
            | RepositoryError::PoolExhausted
            | RepositoryError::Timeout(_) => true,
            RepositoryError::Database(e) => {
                // Check SQLx error for retryable conditions
                matches!(
                    e,
                    sqlx::Error::PoolTimedOut
                        | sqlx::Error::PoolClosed
                        | sqlx::Error::Io(_)
                        | sqlx::Error::Tls(_)
                )
            }
            _ => false,
        }
    }

    /// Which unique field collided, when this is a duplicate-key violation
    ///
    /// Postgres reports unique violations as SQLSTATE 23505; the violated
    /// constraint name identifies the field.
    pub fn duplicate_field(&self) -> Option<DuplicateField> {
        match self {
            RepositoryError::Duplicate(field) => Some(*field),
            RepositoryError::Database(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("23505") =>
            {
                match db_err.constraint() {
                    Some(EMAIL_CONSTRAINT) => Some(DuplicateField::Email),
                    Some(CODE_CONSTRAINT) => Some(DuplicateField::Code),
                    // Unknown unique index still reads as a code conflict,
                    // the only other unique column
                    _ => Some(DuplicateField::Code),
                }
            }
            _ => None,
        }
    }

    /// Check if this is a conflict error (duplicate key)
    pub fn is_conflict(&self) -> bool {
        self.duplicate_field().is_some()
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RepositoryError::NotFound(_) | RepositoryError::Database(sqlx::Error::RowNotFound)
        )
    }
}

/// Convert repository errors to application errors, preserving the
/// duplicate-field distinction regardless of which layer detected it
impl From<RepositoryError> for crate::error::Error {
    fn from(err: RepositoryError) -> Self {
        match err.duplicate_field() {
            Some(DuplicateField::Code) => {
                return crate::error::Error::DuplicateCode(err.to_string())
            }
            Some(DuplicateField::Email) => {
                return crate::error::Error::DuplicateEmail(err.to_string())
            }
            None => {}
        }
        match err {
            RepositoryError::NotFound(msg) => crate::error::Error::NotFound(msg),
            RepositoryError::Invalid(errors) => crate::error::Error::Validation(errors),
            _ => crate::error::Error::database(err.to_string()),
        }
    }
}

/// Base repository trait
#[async_trait]
pub trait Repository: Send + Sync {
    /// The entity type this repository manages
    type Entity: Send + Sync;

    /// The ID type for the entity
    type Id: Send + Sync + Debug;

    /// Find an entity by ID
    async fn find_by_id(&self, id: Self::Id) -> RepositoryResult<Option<Self::Entity>>;

    /// Check if an entity exists
    async fn exists(&self, id: Self::Id) -> RepositoryResult<bool>;

    /// Delete an entity by ID, returning the deleted entity
    async fn delete(&self, id: Self::Id) -> RepositoryResult<Option<Self::Entity>>;

    /// Count total entities
    async fn count(&self) -> RepositoryResult<i64>;

    /// Health check for the repository
    async fn health_check(&self) -> RepositoryResult<()>;
}

/// Retry configuration for transient repository failures
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    pub max_backoff_ms: u64,
    /// Backoff multiplier
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Set the initial backoff
    pub fn with_initial_backoff(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    /// Set the maximum backoff
    pub fn with_max_backoff(mut self, ms: u64) -> Self {
        self.max_backoff_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_retryable() {
        assert!(RepositoryError::Connection("test".to_string()).is_retryable());
        assert!(RepositoryError::PoolExhausted.is_retryable());
        assert!(RepositoryError::Timeout("test".to_string()).is_retryable());
        assert!(!RepositoryError::NotFound("test".to_string()).is_retryable());
        assert!(!RepositoryError::Duplicate(DuplicateField::Code).is_retryable());
    }

    #[test]
    fn test_repository_error_conflict() {
        assert!(RepositoryError::Duplicate(DuplicateField::Code).is_conflict());
        assert!(RepositoryError::Duplicate(DuplicateField::Email).is_conflict());
        assert!(!RepositoryError::NotFound("test".to_string()).is_conflict());
    }

    #[test]
    fn test_duplicate_field_mapping_to_app_error() {
        let err: crate::error::Error = RepositoryError::Duplicate(DuplicateField::Code).into();
        assert!(matches!(err, crate::error::Error::DuplicateCode(_)));

        let err: crate::error::Error = RepositoryError::Duplicate(DuplicateField::Email).into();
        assert!(matches!(err, crate::error::Error::DuplicateEmail(_)));

        let err: crate::error::Error = RepositoryError::NotFound("x".to_string()).into();
        assert!(matches!(err, crate::error::Error::NotFound(_)));
    }

    #[test]
    fn test_repository_error_not_found() {
        assert!(RepositoryError::NotFound("test".to_string()).is_not_found());
        assert!(!RepositoryError::Duplicate(DuplicateField::Code).is_not_found());
    }

    #[test]
    fn test_retry_config() {
        let config = RetryConfig::new(5).with_initial_backoff(200).with_max_backoff(5000);

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.initial_backoff_ms, 200);
        assert_eq!(config.max_backoff_ms, 5000);
        assert_eq!(config.multiplier, 2.0);
    }
}
