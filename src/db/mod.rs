//! Database module for rosterd
//!
//! This module provides database connectivity, connection pooling,
//! and repository implementations for persistent storage.

pub mod pool;
pub mod repository;
pub mod student_repo;

// Re-export commonly used types
pub use pool::{create_pool, DbPool};
pub use repository::{
    DuplicateField, Repository, RepositoryError, RepositoryResult, RetryConfig,
};
pub use student_repo::{PgStudentRepository, StudentRepository};

use sqlx::migrate::Migrator;

/// Database migrator for running schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
