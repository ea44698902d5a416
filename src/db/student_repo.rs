//! Student repository implementation for rosterd
//!
//! This module provides the PostgreSQL implementation of the student
//! repository. The store is the final arbiter of uniqueness: unique indexes
//! on `code` and (partially, non-null only) `email` reject conflicting writes
//! atomically, and the resulting violations surface as structured duplicate
//! errors naming the colliding field.

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    db::{
        repository::{Repository, RepositoryError, RepositoryResult, RetryConfig},
        DbPool,
    },
    models::{District, StudentCode, StudentRecord},
};

/// Column list shared by every query returning full records
const STUDENT_COLUMNS: &str = "id, code, first_name, middle_name, last_name, birth_date, age, \
     address_line1, address_line2, city, district, contact_number, email, created_at, updated_at";

/// Student repository trait
#[async_trait]
pub trait StudentRepository: Repository<Entity = StudentRecord, Id = Uuid> {
    /// Insert a new record; fails with a duplicate conflict if `code` or a
    /// non-null `email` already exists
    async fn insert(&self, student: &StudentRecord) -> RepositoryResult<StudentRecord>;

    /// Persist a full updated record by id
    async fn update(&self, student: &StudentRecord) -> RepositoryResult<StudentRecord>;

    /// The numerically greatest stored code, if any records exist
    async fn max_code(&self) -> RepositoryResult<Option<StudentCode>>;

    /// List records, optionally filtered by a case-insensitive substring over
    /// code, first name, last name, city, and district; ascending by code
    async fn search(&self, query: Option<&str>) -> RepositoryResult<Vec<StudentRecord>>;

    /// Whether a normalized email is held by any record other than `exclude`
    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> RepositoryResult<bool>;
}

/// PostgreSQL implementation of StudentRepository
pub struct PgStudentRepository {
    pool: DbPool,
    retry_config: RetryConfig,
}

impl PgStudentRepository {
    /// Create a new PostgreSQL student repository
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            retry_config: RetryConfig::default(),
        }
    }

    /// Create with custom retry configuration
    pub fn with_retry_config(pool: DbPool, retry_config: RetryConfig) -> Self {
        Self { pool, retry_config }
    }

    /// Execute a query with retry logic for transient failures
    ///
    /// Conflict and validation errors are permanent here; only connection
    /// class failures are retried.
    async fn execute_with_retry<F, T>(&self, operation: F) -> RepositoryResult<T>
    where
        F: Fn() -> futures::future::BoxFuture<'static, Result<T, RepositoryError>>,
    {
        let backoff = ExponentialBackoff {
            initial_interval: Duration::from_millis(self.retry_config.initial_backoff_ms),
            max_interval: Duration::from_millis(self.retry_config.max_backoff_ms),
            multiplier: self.retry_config.multiplier,
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            match operation().await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    tracing::warn!(error = ?e, "Retrying database operation");
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await
    }

    /// Convert a database row to a StudentRecord
    fn row_to_student(row: &sqlx::postgres::PgRow) -> RepositoryResult<StudentRecord> {
        let code_str: String = row.try_get("code")?;
        let code = StudentCode::parse(&code_str)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let district_str: String = row.try_get("district")?;
        let district = District::from_str(&district_str)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        Ok(StudentRecord {
            id: row.try_get("id")?,
            code,
            first_name: row.try_get("first_name")?,
            middle_name: row.try_get("middle_name")?,
            last_name: row.try_get("last_name")?,
            birth_date: row.try_get("birth_date")?,
            age: row.try_get("age")?,
            address_line1: row.try_get("address_line1")?,
            address_line2: row.try_get("address_line2")?,
            city: row.try_get("city")?,
            district,
            contact_number: row.try_get("contact_number")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Escape LIKE wildcards in user-supplied search text
    fn like_pattern(query: &str) -> String {
        let escaped = query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        format!("%{}%", escaped)
    }
}

#[async_trait]
impl Repository for PgStudentRepository {
    type Entity = StudentRecord;
    type Id = Uuid;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<StudentRecord>> {
        let pool = self.pool.clone();

        self.execute_with_retry(|| {
            let pool = pool.clone();
            Box::pin(async move {
                let result =
                    sqlx::query(&format!("SELECT {} FROM students WHERE id = $1", STUDENT_COLUMNS))
                        .bind(id)
                        .fetch_optional(&pool)
                        .await?;

                match result {
                    Some(row) => Ok(Some(Self::row_to_student(&row)?)),
                    None => Ok(None),
                }
            })
        })
        .await
    }

    async fn exists(&self, id: Uuid) -> RepositoryResult<bool> {
        let pool = self.pool.clone();

        self.execute_with_retry(|| {
            let pool = pool.clone();
            Box::pin(async move {
                let result = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)",
                )
                .bind(id)
                .fetch_one(&pool)
                .await?;

                Ok(result)
            })
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<Option<StudentRecord>> {
        let pool = self.pool.clone();

        self.execute_with_retry(|| {
            let pool = pool.clone();
            Box::pin(async move {
                let result = sqlx::query(&format!(
                    "DELETE FROM students WHERE id = $1 RETURNING {}",
                    STUDENT_COLUMNS
                ))
                .bind(id)
                .fetch_optional(&pool)
                .await?;

                match result {
                    Some(row) => Ok(Some(Self::row_to_student(&row)?)),
                    None => Ok(None),
                }
            })
        })
        .await
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let pool = self.pool.clone();

        self.execute_with_retry(|| {
            let pool = pool.clone();
            Box::pin(async move {
                let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
                    .fetch_one(&pool)
                    .await?;

                Ok(count)
            })
        })
        .await
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| RepositoryError::Connection(format!("Health check failed: {}", e)))
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn insert(&self, student: &StudentRecord) -> RepositoryResult<StudentRecord> {
        // The store independently re-validates; the entry surface's checks
        // are not the enforcement point
        student
            .validate_fields()
            .map_err(RepositoryError::Invalid)?;

        let pool = self.pool.clone();
        let student = student.clone();

        self.execute_with_retry(|| {
            let pool = pool.clone();
            let student = student.clone();
            Box::pin(async move {
                let row = sqlx::query(&format!(
                    r#"
                    INSERT INTO students (
                        id, code, first_name, middle_name, last_name, birth_date, age,
                        address_line1, address_line2, city, district, contact_number, email
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                    RETURNING {}
                    "#,
                    STUDENT_COLUMNS
                ))
                .bind(student.id)
                .bind(student.code.to_string())
                .bind(&student.first_name)
                .bind(&student.middle_name)
                .bind(&student.last_name)
                .bind(student.birth_date)
                .bind(student.age)
                .bind(&student.address_line1)
                .bind(&student.address_line2)
                .bind(&student.city)
                .bind(student.district.as_str())
                .bind(&student.contact_number)
                .bind(&student.email)
                .fetch_one(&pool)
                .await?;

                Self::row_to_student(&row)
            })
        })
        .await
    }

    async fn update(&self, student: &StudentRecord) -> RepositoryResult<StudentRecord> {
        student
            .validate_fields()
            .map_err(RepositoryError::Invalid)?;

        let pool = self.pool.clone();
        let student = student.clone();

        self.execute_with_retry(|| {
            let pool = pool.clone();
            let student = student.clone();
            Box::pin(async move {
                let row = sqlx::query(&format!(
                    r#"
                    UPDATE students SET
                        first_name = $2, middle_name = $3, last_name = $4,
                        birth_date = $5, age = $6, address_line1 = $7,
                        address_line2 = $8, city = $9, district = $10,
                        contact_number = $11, email = $12, updated_at = now()
                    WHERE id = $1
                    RETURNING {}
                    "#,
                    STUDENT_COLUMNS
                ))
                .bind(student.id)
                .bind(&student.first_name)
                .bind(&student.middle_name)
                .bind(&student.last_name)
                .bind(student.birth_date)
                .bind(student.age)
                .bind(&student.address_line1)
                .bind(&student.address_line2)
                .bind(&student.city)
                .bind(student.district.as_str())
                .bind(&student.contact_number)
                .bind(&student.email)
                .fetch_optional(&pool)
                .await?;

                match row {
                    Some(row) => Self::row_to_student(&row),
                    None => Err(RepositoryError::NotFound(format!(
                        "Student not found: {}",
                        student.id
                    ))),
                }
            })
        })
        .await
    }

    async fn max_code(&self) -> RepositoryResult<Option<StudentCode>> {
        let pool = self.pool.clone();

        self.execute_with_retry(|| {
            let pool = pool.clone();
            Box::pin(async move {
                // Length-then-lexicographic order is numeric order for
                // zero-padded codes, including those past STU_9999
                let code: Option<String> = sqlx::query_scalar(
                    "SELECT code FROM students ORDER BY length(code) DESC, code DESC LIMIT 1",
                )
                .fetch_optional(&pool)
                .await?;

                match code {
                    Some(raw) => StudentCode::parse(&raw)
                        .map(Some)
                        .map_err(|e| RepositoryError::Serialization(e.to_string())),
                    None => Ok(None),
                }
            })
        })
        .await
    }

    async fn search(&self, query: Option<&str>) -> RepositoryResult<Vec<StudentRecord>> {
        let pool = self.pool.clone();
        let pattern = query.map(Self::like_pattern);

        self.execute_with_retry(|| {
            let pool = pool.clone();
            let pattern = pattern.clone();
            Box::pin(async move {
                let rows = match pattern {
                    Some(pattern) => {
                        sqlx::query(&format!(
                            r#"
                            SELECT {} FROM students
                            WHERE code ILIKE $1 OR first_name ILIKE $1 OR last_name ILIKE $1
                               OR city ILIKE $1 OR district ILIKE $1
                            ORDER BY length(code), code
                            "#,
                            STUDENT_COLUMNS
                        ))
                        .bind(pattern)
                        .fetch_all(&pool)
                        .await?
                    }
                    None => {
                        sqlx::query(&format!(
                            "SELECT {} FROM students ORDER BY length(code), code",
                            STUDENT_COLUMNS
                        ))
                        .fetch_all(&pool)
                        .await?
                    }
                };

                rows.iter().map(Self::row_to_student).collect()
            })
        })
        .await
    }

    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> RepositoryResult<bool> {
        let pool = self.pool.clone();
        let email = email.to_string();

        self.execute_with_retry(|| {
            let pool = pool.clone();
            let email = email.clone();
            Box::pin(async move {
                let taken = sqlx::query_scalar::<_, bool>(
                    r#"
                    SELECT EXISTS(
                        SELECT 1 FROM students
                        WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
                    )
                    "#,
                )
                .bind(email)
                .bind(exclude)
                .fetch_one(&pool)
                .await?;

                Ok(taken)
            })
        })
        .await
    }
}
