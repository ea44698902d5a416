//! Shared field validation rules for rosterd models
//!
//! This is the single rule-set consumed by every layer that accepts or stores
//! student data: the validator-derive entry checks on inbound payloads, the
//! service-level normalization, and the repository's re-validation before a
//! write. Keeping one module avoids the drift of independently maintained
//! copies of the same rules.

use chrono::{NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;

use super::district::District;
use super::error::{ValidationError, ValidationErrorKind};

/// Minimum trimmed length for name fields
pub const NAME_MIN_LEN: usize = 2;
/// Maximum trimmed length for name fields
pub const NAME_MAX_LEN: usize = 50;
/// Minimum trimmed length for city
pub const CITY_MIN_LEN: usize = 2;
/// Minimum trimmed length for the first address line
pub const ADDRESS_MIN_LEN: usize = 5;

// Lazy static regex patterns
static ALPHA_SPACE_REGEX: OnceLock<Regex> = OnceLock::new();
static CONTACT_REGEX: OnceLock<Regex> = OnceLock::new();
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Get or initialize the letters-and-spaces pattern
fn alpha_space_regex() -> &'static Regex {
    ALPHA_SPACE_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z\s]+$").expect("Invalid alphabetic regex pattern"))
}

/// Get or initialize the 10-digit contact number pattern
fn contact_regex() -> &'static Regex {
    CONTACT_REGEX.get_or_init(|| Regex::new(r"^[0-9]{10}$").expect("Invalid contact regex pattern"))
}

/// Get or initialize the email shape pattern (`local@domain.tld`)
fn email_regex() -> &'static Regex {
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"))
}

/// Validate a required name field; returns the trimmed value
pub fn validate_name(value: &str, field_name: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::Required, field_name));
    }
    if trimmed.chars().count() < NAME_MIN_LEN {
        return Err(ValidationError::new(
            ValidationErrorKind::TooShort { min: NAME_MIN_LEN },
            field_name,
        ));
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        return Err(ValidationError::new(
            ValidationErrorKind::TooLong { max: NAME_MAX_LEN },
            field_name,
        ));
    }
    if !alpha_space_regex().is_match(trimmed) {
        return Err(ValidationError::new(
            ValidationErrorKind::NotAlphabetic,
            field_name,
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate an optional name field (no length bound); blank becomes absent
pub fn validate_optional_name(
    value: Option<&str>,
    field_name: &str,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            if !alpha_space_regex().is_match(trimmed) {
                return Err(ValidationError::new(
                    ValidationErrorKind::NotAlphabetic,
                    field_name,
                ));
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}

/// Validate the city field; returns the trimmed value
pub fn validate_city(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::Required, "city"));
    }
    if trimmed.chars().count() < CITY_MIN_LEN {
        return Err(ValidationError::new(
            ValidationErrorKind::TooShort { min: CITY_MIN_LEN },
            "city",
        ));
    }
    if !alpha_space_regex().is_match(trimmed) {
        return Err(ValidationError::new(ValidationErrorKind::NotAlphabetic, "city"));
    }
    Ok(trimmed.to_string())
}

/// Validate the district against the closed enumeration (case-sensitive)
pub fn validate_district(value: &str) -> Result<District, ValidationError> {
    District::from_str(value.trim())
}

/// Validate the first address line; returns the trimmed value
pub fn validate_address_line1(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::Required,
            "addressLine1",
        ));
    }
    if trimmed.chars().count() < ADDRESS_MIN_LEN {
        return Err(ValidationError::new(
            ValidationErrorKind::TooShort { min: ADDRESS_MIN_LEN },
            "addressLine1",
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate the contact number: exactly 10 ASCII digits
pub fn validate_contact_number(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::Required,
            "contactNumber",
        ));
    }
    if !contact_regex().is_match(trimmed) {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidContactNumber,
            "contactNumber",
        ));
    }
    Ok(trimmed.to_string())
}

/// Normalize an optional email: trim, lower-case, blank becomes absent
pub fn normalize_email(value: Option<&str>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    })
}

/// Validate an optional email; returns the normalized value when present
pub fn validate_email(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    match normalize_email(value) {
        None => Ok(None),
        Some(normalized) => {
            if !email_regex().is_match(&normalized) {
                return Err(ValidationError::new(ValidationErrorKind::InvalidEmail, "email"));
            }
            Ok(Some(normalized))
        }
    }
}

/// Normalize an unconstrained optional field: trim, blank becomes absent
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Parse and validate a birth date string (`YYYY-MM-DD`)
pub fn validate_birth_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::Required, "birthDate"));
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| {
        ValidationError::with_context(
            ValidationErrorKind::InvalidDate,
            "birthDate",
            format!("Failed to parse date: {}", e),
        )
    })?;
    validate_birth_date_value(date)?;
    Ok(date)
}

/// Check an already-parsed birth date is strictly before the current moment
///
/// A date equal to today passes: its midnight precedes the current moment.
pub fn validate_birth_date_value(date: NaiveDate) -> Result<(), ValidationError> {
    if date > Utc::now().date_naive() {
        return Err(ValidationError::new(
            ValidationErrorKind::DateNotInPast,
            "birthDate",
        ));
    }
    Ok(())
}

// Thin wrappers over the same rules for the validator derive on payloads.
// The derive is the fail-fast entry check; the functions above remain the
// authoritative path, re-run before every write.

fn derive_error(err: &ValidationError) -> validator::ValidationError {
    let mut out = validator::ValidationError::new("field");
    out.message = Some(err.message().into());
    out
}

/// Validator-derive hook for required name fields
pub fn check_name(value: &str) -> Result<(), validator::ValidationError> {
    validate_name(value, "name").map(|_| ()).map_err(|e| derive_error(&e))
}

/// Validator-derive hook for optional letters-and-spaces fields
pub fn check_optional_name(value: &str) -> Result<(), validator::ValidationError> {
    validate_optional_name(Some(value), "name")
        .map(|_| ())
        .map_err(|e| derive_error(&e))
}

/// Validator-derive hook for the city field
pub fn check_city(value: &str) -> Result<(), validator::ValidationError> {
    validate_city(value).map(|_| ()).map_err(|e| derive_error(&e))
}

/// Validator-derive hook for the district field
pub fn check_district(value: &str) -> Result<(), validator::ValidationError> {
    validate_district(value).map(|_| ()).map_err(|e| derive_error(&e))
}

/// Validator-derive hook for the first address line
pub fn check_address_line1(value: &str) -> Result<(), validator::ValidationError> {
    validate_address_line1(value).map(|_| ()).map_err(|e| derive_error(&e))
}

/// Validator-derive hook for the contact number
pub fn check_contact_number(value: &str) -> Result<(), validator::ValidationError> {
    validate_contact_number(value).map(|_| ()).map_err(|e| derive_error(&e))
}

/// Validator-derive hook for the optional email field
pub fn check_email(value: &str) -> Result<(), validator::ValidationError> {
    validate_email(Some(value)).map(|_| ()).map_err(|e| derive_error(&e))
}

/// Validator-derive hook for the birth date string
pub fn check_birth_date(value: &str) -> Result<(), validator::ValidationError> {
    validate_birth_date(value).map(|_| ()).map_err(|e| derive_error(&e))
}
