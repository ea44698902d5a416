//! Data models for rosterd
//!
//! This module contains the domain model used throughout the application:
//! the student record, the closed district enumeration, the student-code
//! sequence, the fixed-reference-date age derivation, and the shared field
//! validation rules.

pub mod age;
pub mod code;
pub mod district;
pub mod error;
pub mod student;
pub mod validation;

// Re-export commonly used types
pub use code::StudentCode;
pub use district::District;
pub use error::{ValidationError, ValidationErrorKind, ValidationErrors};
pub use student::{NewStudent, StudentRecord, StudentUpdate, ValidatedStudent};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        // Ensure all key types are accessible
        let _district = District::Colombo;
        let _code = StudentCode::first();
        let _error = ValidationError::new(ValidationErrorKind::Required, "test");
        assert_eq!(age::age_at_reference(
            chrono::NaiveDate::from_ymd_opt(2007, 1, 1).unwrap()
        ), 18);
    }
}
