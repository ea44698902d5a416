//! Record service orchestration for rosterd
//!
//! Coordinates validation, code generation, age derivation, and duplicate
//! checks around the repository. The "find max then insert" code assignment
//! is racy under concurrent creates, so creation attempts the insert, catches
//! the store's duplicate-code violation, and regenerates a bounded number of
//! times before surfacing the conflict.

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{DuplicateField, StudentRepository},
    error::{Error, Result},
    models::{NewStudent, StudentCode, StudentRecord, StudentUpdate},
};

/// Default number of creation attempts before a code conflict is surfaced
pub const DEFAULT_CODE_RETRY_ATTEMPTS: u32 = 3;

/// Orchestrates create/update/delete/read flows over a student repository
#[derive(Clone)]
pub struct StudentService {
    repo: Arc<dyn StudentRepository>,
    code_retry_attempts: u32,
}

impl StudentService {
    /// Create a service with the default retry bound
    pub fn new(repo: Arc<dyn StudentRepository>) -> Self {
        Self {
            repo,
            code_retry_attempts: DEFAULT_CODE_RETRY_ATTEMPTS,
        }
    }

    /// Create a service with an explicit retry bound (minimum 1 attempt)
    pub fn with_code_retry_attempts(repo: Arc<dyn StudentRepository>, attempts: u32) -> Self {
        Self {
            repo,
            code_retry_attempts: attempts.max(1),
        }
    }

    /// Create a new student record
    ///
    /// Validates and normalizes the payload, pre-checks email uniqueness,
    /// assigns the next sequential code, derives the age, and persists. On a
    /// duplicate-code conflict the max is re-queried and the insert
    /// resubmitted, up to the retry bound. No partial write occurs on any
    /// failure.
    pub async fn create(&self, input: NewStudent) -> Result<StudentRecord> {
        let validated = input.validate_fields()?;

        // Fail fast on a taken email; the store's unique index remains the
        // final arbiter if another writer sneaks in between
        if let Some(email) = &validated.email {
            if self.repo.email_taken(email, None).await? {
                return Err(Error::DuplicateEmail(email.clone()));
            }
        }

        let mut attempt = 0;
        loop {
            attempt += 1;

            let code = match self.repo.max_code().await? {
                Some(max) => max.next(),
                None => StudentCode::first(),
            };
            let record = validated.clone().into_record(Uuid::new_v4(), code);

            match self.repo.insert(&record).await {
                Ok(stored) => {
                    tracing::info!(
                        id = %stored.id,
                        code = %stored.code,
                        attempt,
                        "Student created"
                    );
                    return Ok(stored);
                }
                Err(e)
                    if e.duplicate_field() == Some(DuplicateField::Code)
                        && attempt < self.code_retry_attempts =>
                {
                    tracing::warn!(
                        code = %code,
                        attempt,
                        "Student code conflict, regenerating"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Update an existing student record
    ///
    /// The supplied fields are merged onto the stored record; `code` is not
    /// representable in the payload and can never change. Age is recomputed
    /// when the birth date changes; the merged result is fully re-validated
    /// before committing.
    pub async fn update(&self, id: Uuid, input: StudentUpdate) -> Result<StudentRecord> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Student not found: {}", id)))?;

        // Reject an email already held by a different record
        if let Some(Some(email)) = input.normalized_email() {
            if self.repo.email_taken(&email, Some(id)).await? {
                return Err(Error::DuplicateEmail(email));
            }
        }

        let merged = input.apply_to(&existing)?;
        let stored = self.repo.update(&merged).await?;

        tracing::info!(id = %stored.id, code = %stored.code, "Student updated");
        Ok(stored)
    }

    /// Delete a student by id, returning the deleted record
    pub async fn delete(&self, id: Uuid) -> Result<StudentRecord> {
        let deleted = self
            .repo
            .delete(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Student not found: {}", id)))?;

        tracing::info!(id = %deleted.id, code = %deleted.code, "Student deleted");
        Ok(deleted)
    }

    /// Get a single student by id
    pub async fn get(&self, id: Uuid) -> Result<StudentRecord> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Student not found: {}", id)))
    }

    /// List students, optionally filtered by a free-text query
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<StudentRecord>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        Ok(self.repo.search(query).await?)
    }

    /// Check the backing store is reachable
    pub async fn health(&self) -> Result<()> {
        Ok(self.repo.health_check().await?)
    }
}
