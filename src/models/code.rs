//! Student code generation
//!
//! Codes have the shape `STU_` followed by the sequence number zero-padded to
//! four digits. Padding never truncates: sequence 10000 formats as
//! `STU_10000`. Codes are assigned once at creation and never reassigned.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{ValidationError, ValidationErrorKind};

/// Prefix shared by every student code
pub const CODE_PREFIX: &str = "STU_";

/// Width the numeric suffix is zero-padded to
const CODE_PAD_WIDTH: usize = 4;

/// An immutable, sequentially generated student code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentCode(u32);

impl StudentCode {
    /// The first code in an empty registry (`STU_0001`)
    pub fn first() -> Self {
        StudentCode(1)
    }

    /// The code following this one in the sequence
    pub fn next(&self) -> Self {
        StudentCode(self.0 + 1)
    }

    /// The numeric sequence value
    pub fn sequence(&self) -> u32 {
        self.0
    }

    /// Parse a code string of the form `STU_NNNN`
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let suffix = s.strip_prefix(CODE_PREFIX).ok_or_else(|| {
            ValidationError::with_context(
                ValidationErrorKind::InvalidCode,
                "code",
                format!("Missing '{}' prefix: {}", CODE_PREFIX, s),
            )
        })?;

        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::with_context(
                ValidationErrorKind::InvalidCode,
                "code",
                format!("Non-numeric code suffix: {}", s),
            ));
        }

        let sequence: u32 = suffix.parse().map_err(|e| {
            ValidationError::with_context(
                ValidationErrorKind::InvalidCode,
                "code",
                format!("Failed to parse code suffix: {}", e),
            )
        })?;

        Ok(StudentCode(sequence))
    }
}

impl fmt::Display for StudentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:0width$}", CODE_PREFIX, self.0, width = CODE_PAD_WIDTH)
    }
}

impl TryFrom<String> for StudentCode {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        StudentCode::parse(&s)
    }
}

impl From<StudentCode> for String {
    fn from(code: StudentCode) -> Self {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_code() {
        assert_eq!(StudentCode::first().to_string(), "STU_0001");
    }

    #[test]
    fn test_code_sequence() {
        let mut code = StudentCode::first();
        code = code.next();
        assert_eq!(code.to_string(), "STU_0002");
        code = code.next();
        assert_eq!(code.to_string(), "STU_0003");
    }

    #[test]
    fn test_next_from_existing_max() {
        let max = StudentCode::parse("STU_0042").unwrap();
        assert_eq!(max.next().to_string(), "STU_0043");
    }

    #[test]
    fn test_padding_does_not_truncate() {
        let code = StudentCode::parse("STU_9999").unwrap().next();
        assert_eq!(code.to_string(), "STU_10000");
        assert_eq!(code.next().to_string(), "STU_10001");
    }

    #[test]
    fn test_parse_round_trip() {
        for raw in ["STU_0001", "STU_0042", "STU_10000"] {
            let code = StudentCode::parse(raw).unwrap();
            assert_eq!(code.to_string(), raw);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in ["STU_", "STU_12ab", "stu_0001", "0001", "STU-0001", ""] {
            assert!(StudentCode::parse(raw).is_err(), "should reject {:?}", raw);
        }
    }

    #[test]
    fn test_numeric_ordering() {
        let small = StudentCode::parse("STU_9999").unwrap();
        let large = StudentCode::parse("STU_10000").unwrap();
        // Lexicographic string order would invert these
        assert!(small < large);
    }

    #[test]
    fn test_serde_as_string() {
        let code = StudentCode::parse("STU_0007").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"STU_0007\"");

        let parsed: StudentCode = serde_json::from_str("\"STU_0008\"").unwrap();
        assert_eq!(parsed.sequence(), 8);
    }
}
