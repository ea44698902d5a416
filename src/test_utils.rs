//! Test utilities for rosterd
//!
//! This module provides an in-memory mock repository that mirrors the
//! store's behavior, including its uniqueness enforcement and its
//! re-validation of records at the storage boundary.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::db::repository::{DuplicateField, Repository, RepositoryError, RepositoryResult};
use crate::db::student_repo::StudentRepository;
use crate::models::{StudentCode, StudentRecord};

/// Mock implementation of StudentRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockStudentRepository {
    students: Arc<Mutex<Vec<StudentRecord>>>,
    fail_next: Arc<Mutex<Option<String>>>,
    stale_code_inserts: Arc<Mutex<u32>>,
}

impl MockStudentRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on the next operation
    pub fn fail_next_operation(&self, error_message: &str) {
        *self.fail_next.lock().unwrap() = Some(error_message.to_string());
    }

    /// Make the next `n` inserts fail with a duplicate-code conflict,
    /// simulating a concurrent writer claiming the same generated code
    pub fn stale_code_on_next_inserts(&self, n: u32) {
        *self.stale_code_inserts.lock().unwrap() = n;
    }

    /// Get all stored records
    pub fn get_all(&self) -> Vec<StudentRecord> {
        self.students.lock().unwrap().clone()
    }

    /// Add a record directly, bypassing validation
    pub fn add_record(&self, record: StudentRecord) {
        self.students.lock().unwrap().push(record);
    }

    /// Clear all records
    pub fn clear(&self) {
        self.students.lock().unwrap().clear();
    }

    fn check_failure(&self) -> RepositoryResult<()> {
        if let Some(msg) = self.fail_next.lock().unwrap().take() {
            return Err(RepositoryError::QueryExecution(msg));
        }
        Ok(())
    }

    fn matches_query(record: &StudentRecord, query: &str) -> bool {
        let q = query.to_lowercase();
        record.code.to_string().to_lowercase().contains(&q)
            || record.first_name.to_lowercase().contains(&q)
            || record.last_name.to_lowercase().contains(&q)
            || record.city.to_lowercase().contains(&q)
            || record.district.as_str().to_lowercase().contains(&q)
    }
}

#[async_trait]
impl Repository for MockStudentRepository {
    type Entity = StudentRecord;
    type Id = Uuid;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<StudentRecord>> {
        self.check_failure()?;
        let students = self.students.lock().unwrap();
        Ok(students.iter().find(|s| s.id == id).cloned())
    }

    async fn exists(&self, id: Uuid) -> RepositoryResult<bool> {
        self.check_failure()?;
        let students = self.students.lock().unwrap();
        Ok(students.iter().any(|s| s.id == id))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<Option<StudentRecord>> {
        self.check_failure()?;
        let mut students = self.students.lock().unwrap();
        let position = students.iter().position(|s| s.id == id);
        Ok(position.map(|pos| students.remove(pos)))
    }

    async fn count(&self) -> RepositoryResult<i64> {
        self.check_failure()?;
        Ok(self.students.lock().unwrap().len() as i64)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        self.check_failure()
    }
}

#[async_trait]
impl StudentRepository for MockStudentRepository {
    async fn insert(&self, student: &StudentRecord) -> RepositoryResult<StudentRecord> {
        self.check_failure()?;

        // Storage re-validates regardless of what the entry surface did
        student.validate_fields().map_err(RepositoryError::Invalid)?;

        {
            let mut stale = self.stale_code_inserts.lock().unwrap();
            if *stale > 0 {
                *stale -= 1;
                return Err(RepositoryError::Duplicate(DuplicateField::Code));
            }
        }

        let mut students = self.students.lock().unwrap();

        if students.iter().any(|s| s.code == student.code) {
            return Err(RepositoryError::Duplicate(DuplicateField::Code));
        }
        if let Some(email) = &student.email {
            if students.iter().any(|s| s.email.as_deref() == Some(email)) {
                return Err(RepositoryError::Duplicate(DuplicateField::Email));
            }
        }

        students.push(student.clone());
        Ok(student.clone())
    }

    async fn update(&self, student: &StudentRecord) -> RepositoryResult<StudentRecord> {
        self.check_failure()?;

        student.validate_fields().map_err(RepositoryError::Invalid)?;

        let mut students = self.students.lock().unwrap();

        if let Some(email) = &student.email {
            let taken = students
                .iter()
                .any(|s| s.id != student.id && s.email.as_deref() == Some(email));
            if taken {
                return Err(RepositoryError::Duplicate(DuplicateField::Email));
            }
        }

        match students.iter_mut().find(|s| s.id == student.id) {
            Some(existing) => {
                let mut updated = student.clone();
                updated.updated_at = chrono::Utc::now();
                *existing = updated.clone();
                Ok(updated)
            }
            None => Err(RepositoryError::NotFound(format!(
                "Student not found: {}",
                student.id
            ))),
        }
    }

    async fn max_code(&self) -> RepositoryResult<Option<StudentCode>> {
        self.check_failure()?;
        let students = self.students.lock().unwrap();
        Ok(students.iter().map(|s| s.code).max())
    }

    async fn search(&self, query: Option<&str>) -> RepositoryResult<Vec<StudentRecord>> {
        self.check_failure()?;
        let students = self.students.lock().unwrap();

        let mut results: Vec<StudentRecord> = students
            .iter()
            .filter(|s| query.map_or(true, |q| Self::matches_query(s, q)))
            .cloned()
            .collect();

        results.sort_by_key(|s| s.code);
        Ok(results)
    }

    async fn email_taken(&self, email: &str, exclude: Option<Uuid>) -> RepositoryResult<bool> {
        self.check_failure()?;
        let students = self.students.lock().unwrap();
        Ok(students
            .iter()
            .any(|s| Some(s.id) != exclude && s.email.as_deref() == Some(email)))
    }
}
