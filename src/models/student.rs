//! Student record models for rosterd
//!
//! This module defines the persisted record, the raw inbound payloads, and
//! the transformations between them. Inbound payloads carry raw strings and
//! are normalized into typed values through the shared validation rules;
//! `code` and `age` are always server-derived and never accepted as input.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::age::age_at_reference;
use super::code::StudentCode;
use super::district::District;
use super::error::{ValidationError, ValidationErrorKind, ValidationErrors};
use super::validation::{
    check_address_line1, check_birth_date, check_city, check_contact_number, check_district,
    check_email, check_name, check_optional_name, normalize_optional, validate_address_line1,
    validate_birth_date, validate_birth_date_value, validate_city, validate_contact_number,
    validate_email, validate_name, validate_optional_name,
};

/// A persisted student record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Opaque unique identifier, immutable after creation
    pub id: Uuid,

    /// Sequentially generated student code, unique, never reassigned
    pub code: StudentCode,

    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,

    /// Birth date, strictly before the current moment
    pub birth_date: NaiveDate,

    /// Derived age as of the fixed reference date; never set externally
    pub age: i32,

    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub district: District,

    /// Exactly 10 decimal digits
    pub contact_number: String,

    /// Normalized (trimmed, lower-cased) email, unique when present
    pub email: Option<String>,

    /// Maintained by the store
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    /// Full display name (`first [middle] last`)
    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// Re-validate every field rule on a complete record
    ///
    /// The repository runs this before any write; the entry-surface checks
    /// are an optimization, not the enforcement point.
    pub fn validate_fields(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.collect(validate_name(&self.first_name, "firstName"));
        errors.collect(validate_optional_name(self.middle_name.as_deref(), "middleName"));
        errors.collect(validate_name(&self.last_name, "lastName"));
        errors.collect(validate_birth_date_value(self.birth_date));
        errors.collect(validate_address_line1(&self.address_line1));
        errors.collect(validate_city(&self.city));
        errors.collect(validate_contact_number(&self.contact_number));
        errors.collect(validate_email(self.email.as_deref()));

        if self.age != age_at_reference(self.birth_date) {
            errors.add(ValidationError::new(
                ValidationErrorKind::Custom("Age is inconsistent with birth date".to_string()),
                "age",
            ));
        }

        errors.into_result(())
    }
}

/// Raw payload for creating a student
///
/// Field set excludes `code` and `age` (both server-derived). The validator
/// derive gives per-field fail-fast feedback at the entry surface through the
/// same shared rules used everywhere else.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    #[validate(custom(function = check_name))]
    pub first_name: String,

    #[validate(custom(function = check_optional_name))]
    pub middle_name: Option<String>,

    #[validate(custom(function = check_name))]
    pub last_name: String,

    /// `YYYY-MM-DD`
    #[validate(custom(function = check_birth_date))]
    pub birth_date: String,

    #[validate(custom(function = check_address_line1))]
    pub address_line1: String,

    pub address_line2: Option<String>,

    #[validate(custom(function = check_city))]
    pub city: String,

    #[validate(custom(function = check_district))]
    pub district: String,

    #[validate(custom(function = check_contact_number))]
    pub contact_number: String,

    #[validate(custom(function = check_email))]
    pub email: Option<String>,
}

impl NewStudent {
    /// Validate all fields, collecting every failure, and produce the
    /// normalized typed values
    pub fn validate_fields(&self) -> Result<ValidatedStudent, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = errors.collect(validate_name(&self.first_name, "firstName"));
        let middle_name =
            errors.collect(validate_optional_name(self.middle_name.as_deref(), "middleName"));
        let last_name = errors.collect(validate_name(&self.last_name, "lastName"));
        let birth_date = errors.collect(validate_birth_date(&self.birth_date));
        let address_line1 = errors.collect(validate_address_line1(&self.address_line1));
        let address_line2 = normalize_optional(self.address_line2.as_deref());
        let city = errors.collect(validate_city(&self.city));
        let district = errors.collect(super::validation::validate_district(&self.district));
        let contact_number = errors.collect(validate_contact_number(&self.contact_number));
        let email = errors.collect(validate_email(self.email.as_deref()));

        if !errors.is_empty() {
            return Err(errors);
        }

        // All collects succeeded when no errors were recorded
        Ok(ValidatedStudent {
            first_name: first_name.expect("validated"),
            middle_name: middle_name.expect("validated"),
            last_name: last_name.expect("validated"),
            birth_date: birth_date.expect("validated"),
            address_line1: address_line1.expect("validated"),
            address_line2,
            city: city.expect("validated"),
            district: district.expect("validated"),
            contact_number: contact_number.expect("validated"),
            email: email.expect("validated"),
        })
    }
}

/// Normalized, typed student data ready for code assignment and persistence
#[derive(Debug, Clone)]
pub struct ValidatedStudent {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub district: District,
    pub contact_number: String,
    pub email: Option<String>,
}

impl ValidatedStudent {
    /// Assemble a full record with the assigned code and derived age
    pub fn into_record(self, id: Uuid, code: StudentCode) -> StudentRecord {
        let now = Utc::now();
        StudentRecord {
            id,
            code,
            age: age_at_reference(self.birth_date),
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            city: self.city,
            district: self.district,
            contact_number: self.contact_number,
            email: self.email,
            // Placeholders; the store's own timestamps are returned on write
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update payload
///
/// Absent fields keep their stored value. `code` is not representable here,
/// so a `code` key in the request body is dropped during deserialization and
/// the stored code can never change. A blank value clears the optional
/// fields (`middleName`, `addressLine2`, `email`).
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StudentUpdate {
    #[validate(custom(function = check_name))]
    pub first_name: Option<String>,

    #[validate(custom(function = check_optional_name))]
    pub middle_name: Option<String>,

    #[validate(custom(function = check_name))]
    pub last_name: Option<String>,

    #[validate(custom(function = check_birth_date))]
    pub birth_date: Option<String>,

    #[validate(custom(function = check_address_line1))]
    pub address_line1: Option<String>,

    pub address_line2: Option<String>,

    #[validate(custom(function = check_city))]
    pub city: Option<String>,

    #[validate(custom(function = check_district))]
    pub district: Option<String>,

    #[validate(custom(function = check_contact_number))]
    pub contact_number: Option<String>,

    #[validate(custom(function = check_email))]
    pub email: Option<String>,
}

impl StudentUpdate {
    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.middle_name.is_none()
            && self.last_name.is_none()
            && self.birth_date.is_none()
            && self.address_line1.is_none()
            && self.address_line2.is_none()
            && self.city.is_none()
            && self.district.is_none()
            && self.contact_number.is_none()
            && self.email.is_none()
    }

    /// The normalized email this update carries, if the field was supplied
    ///
    /// `Some(None)` means the update clears the email.
    pub fn normalized_email(&self) -> Option<Option<String>> {
        self.email
            .as_deref()
            .map(|v| super::validation::normalize_email(Some(v)))
    }

    /// Merge the supplied fields onto an existing record, re-running the
    /// full field validation on the result
    ///
    /// `age` is recomputed when `birthDate` is part of the update; `id`,
    /// `code`, and `createdAt` always carry over unchanged.
    pub fn apply_to(&self, existing: &StudentRecord) -> Result<StudentRecord, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first_name = match &self.first_name {
            Some(v) => errors.collect(validate_name(v, "firstName")),
            None => Some(existing.first_name.clone()),
        };
        let middle_name = match &self.middle_name {
            Some(v) => errors.collect(validate_optional_name(Some(v), "middleName")),
            None => Some(existing.middle_name.clone()),
        };
        let last_name = match &self.last_name {
            Some(v) => errors.collect(validate_name(v, "lastName")),
            None => Some(existing.last_name.clone()),
        };
        let birth_date = match &self.birth_date {
            Some(v) => errors.collect(validate_birth_date(v)),
            None => Some(existing.birth_date),
        };
        let address_line1 = match &self.address_line1 {
            Some(v) => errors.collect(validate_address_line1(v)),
            None => Some(existing.address_line1.clone()),
        };
        let address_line2 = match &self.address_line2 {
            Some(v) => normalize_optional(Some(v)),
            None => existing.address_line2.clone(),
        };
        let city = match &self.city {
            Some(v) => errors.collect(validate_city(v)),
            None => Some(existing.city.clone()),
        };
        let district = match &self.district {
            Some(v) => errors.collect(super::validation::validate_district(v)),
            None => Some(existing.district),
        };
        let contact_number = match &self.contact_number {
            Some(v) => errors.collect(validate_contact_number(v)),
            None => Some(existing.contact_number.clone()),
        };
        let email = match &self.email {
            Some(v) => errors.collect(validate_email(Some(v))),
            None => Some(existing.email.clone()),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let birth_date = birth_date.expect("validated");
        let mut merged = existing.clone();
        merged.first_name = first_name.expect("validated");
        merged.middle_name = middle_name.expect("validated");
        merged.last_name = last_name.expect("validated");
        merged.birth_date = birth_date;
        merged.age = age_at_reference(birth_date);
        merged.address_line1 = address_line1.expect("validated");
        merged.address_line2 = address_line2;
        merged.city = city.expect("validated");
        merged.district = district.expect("validated");
        merged.contact_number = contact_number.expect("validated");
        merged.email = email.expect("validated");

        Ok(merged)
    }
}

#[cfg(test)]
pub struct StudentBuilder {
    first_name: String,
    middle_name: Option<String>,
    last_name: String,
    birth_date: String,
    address_line1: String,
    address_line2: Option<String>,
    city: String,
    district: String,
    contact_number: String,
    email: Option<String>,
}

#[cfg(test)]
impl StudentBuilder {
    pub fn new() -> Self {
        Self {
            first_name: "Nimal".to_string(),
            middle_name: None,
            last_name: "Perera".to_string(),
            birth_date: "2005-06-15".to_string(),
            address_line1: "12 Lake Road".to_string(),
            address_line2: None,
            city: "Kandy".to_string(),
            district: "Kandy".to_string(),
            contact_number: "0771234567".to_string(),
            email: None,
        }
    }

    pub fn first_name(mut self, value: &str) -> Self {
        self.first_name = value.to_string();
        self
    }

    pub fn birth_date(mut self, value: &str) -> Self {
        self.birth_date = value.to_string();
        self
    }

    pub fn district(mut self, value: &str) -> Self {
        self.district = value.to_string();
        self
    }

    pub fn contact_number(mut self, value: &str) -> Self {
        self.contact_number = value.to_string();
        self
    }

    pub fn email(mut self, value: &str) -> Self {
        self.email = Some(value.to_string());
        self
    }

    pub fn build(self) -> NewStudent {
        NewStudent {
            first_name: self.first_name,
            middle_name: self.middle_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            address_line1: self.address_line1,
            address_line2: self.address_line2,
            city: self.city,
            district: self.district,
            contact_number: self.contact_number,
            email: self.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> StudentRecord {
        StudentBuilder::new()
            .build()
            .validate_fields()
            .unwrap()
            .into_record(Uuid::new_v4(), StudentCode::first())
    }

    #[test]
    fn test_new_student_validates_and_normalizes() {
        let new = StudentBuilder::new().email("  Nimal@Example.COM ").build();
        let validated = new.validate_fields().unwrap();

        assert_eq!(validated.first_name, "Nimal");
        assert_eq!(validated.district, District::Kandy);
        assert_eq!(validated.email, Some("nimal@example.com".to_string()));
    }

    #[test]
    fn test_new_student_collects_all_failures() {
        let new = StudentBuilder::new()
            .first_name("N")
            .district("atlantis")
            .contact_number("12345")
            .build();

        let errors = new.validate_fields().unwrap_err();
        assert!(errors.has_field("firstName"));
        assert!(errors.has_field("district"));
        assert!(errors.has_field("contactNumber"));
        assert!(!errors.has_field("lastName"));
    }

    #[test]
    fn test_into_record_derives_age() {
        let new = StudentBuilder::new().birth_date("2007-01-01").build();
        let record = new
            .validate_fields()
            .unwrap()
            .into_record(Uuid::new_v4(), StudentCode::first());

        assert_eq!(record.age, 18);
        assert_eq!(record.code.to_string(), "STU_0001");
    }

    #[test]
    fn test_record_validate_fields_accepts_consistent_record() {
        assert!(record().validate_fields().is_ok());
    }

    #[test]
    fn test_record_validate_fields_rejects_tampered_age() {
        let mut tampered = record();
        tampered.age += 5;
        let errors = tampered.validate_fields().unwrap_err();
        assert!(errors.has_field("age"));
    }

    #[test]
    fn test_record_validate_fields_rejects_bad_contact() {
        let mut tampered = record();
        tampered.contact_number = "12345".to_string();
        assert!(tampered.validate_fields().is_err());
    }

    #[test]
    fn test_update_merges_partial_fields() {
        let existing = record();
        let update = StudentUpdate {
            city: Some("Galle".to_string()),
            ..Default::default()
        };

        let merged = update.apply_to(&existing).unwrap();
        assert_eq!(merged.city, "Galle");
        assert_eq!(merged.first_name, existing.first_name);
        assert_eq!(merged.code, existing.code);
        assert_eq!(merged.id, existing.id);
    }

    #[test]
    fn test_update_recomputes_age_on_birth_date_change() {
        let existing = record();
        let update = StudentUpdate {
            birth_date: Some("2007-01-02".to_string()),
            ..Default::default()
        };

        let merged = update.apply_to(&existing).unwrap();
        assert_eq!(merged.age, 17);
    }

    #[test]
    fn test_update_blank_email_clears_it() {
        let mut existing = record();
        existing.email = Some("old@example.com".to_string());

        let update = StudentUpdate {
            email: Some("   ".to_string()),
            ..Default::default()
        };

        let merged = update.apply_to(&existing).unwrap();
        assert_eq!(merged.email, None);
        assert_eq!(update.normalized_email(), Some(None));
    }

    #[test]
    fn test_update_rejects_invalid_merged_fields() {
        let existing = record();
        let update = StudentUpdate {
            first_name: Some("X".to_string()),
            ..Default::default()
        };

        let errors = update.apply_to(&existing).unwrap_err();
        assert!(errors.has_field("firstName"));
    }

    #[test]
    fn test_update_payload_ignores_code_key() {
        // An unknown `code` key deserializes away silently
        let update: StudentUpdate = serde_json::from_value(serde_json::json!({
            "code": "STU_9999",
            "city": "Matara"
        }))
        .unwrap();

        assert_eq!(update.city.as_deref(), Some("Matara"));
        assert!(!update.is_empty());
    }

    #[test]
    fn test_full_name() {
        let mut r = record();
        assert_eq!(r.full_name(), "Nimal Perera");
        r.middle_name = Some("Kumara".to_string());
        assert_eq!(r.full_name(), "Nimal Kumara Perera");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(record()).unwrap();
        assert!(json.get("firstName").is_some());
        assert!(json.get("addressLine1").is_some());
        assert!(json.get("contactNumber").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
