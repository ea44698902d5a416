//! The closed district enumeration
//!
//! Districts are a fixed set of 25 administrative regions. The enumeration is
//! shared between validation and the presentation layer; any value outside the
//! list is rejected at the validation boundary with a case-sensitive match.

use serde::{Deserialize, Serialize};

use super::error::{ValidationError, ValidationErrorKind};

/// One of the 25 fixed administrative districts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum District {
    Colombo,
    Gampaha,
    Kalutara,
    Kandy,
    Matale,
    #[serde(rename = "Nuwara Eliya")]
    NuwaraEliya,
    Galle,
    Matara,
    Hambantota,
    Jaffna,
    Kilinochchi,
    Mannar,
    Vavuniya,
    Mullaitivu,
    Batticaloa,
    Ampara,
    Trincomalee,
    Kurunegala,
    Puttalam,
    Anuradhapura,
    Polonnaruwa,
    Badulla,
    Monaragala,
    Ratnapura,
    Kegalle,
}

impl District {
    /// All districts, in the order presented to form dropdowns
    pub const ALL: [District; 25] = [
        District::Colombo,
        District::Gampaha,
        District::Kalutara,
        District::Kandy,
        District::Matale,
        District::NuwaraEliya,
        District::Galle,
        District::Matara,
        District::Hambantota,
        District::Jaffna,
        District::Kilinochchi,
        District::Mannar,
        District::Vavuniya,
        District::Mullaitivu,
        District::Batticaloa,
        District::Ampara,
        District::Trincomalee,
        District::Kurunegala,
        District::Puttalam,
        District::Anuradhapura,
        District::Polonnaruwa,
        District::Badulla,
        District::Monaragala,
        District::Ratnapura,
        District::Kegalle,
    ];

    /// Parse a district from its exact display name (case-sensitive)
    pub fn from_str(s: &str) -> Result<Self, ValidationError> {
        District::ALL
            .iter()
            .find(|d| d.as_str() == s)
            .copied()
            .ok_or_else(|| {
                ValidationError::with_context(
                    ValidationErrorKind::InvalidDistrict,
                    "district",
                    format!("Unknown district: {}", s),
                )
            })
    }

    /// Display name, as stored and presented
    pub fn as_str(&self) -> &'static str {
        match self {
            District::Colombo => "Colombo",
            District::Gampaha => "Gampaha",
            District::Kalutara => "Kalutara",
            District::Kandy => "Kandy",
            District::Matale => "Matale",
            District::NuwaraEliya => "Nuwara Eliya",
            District::Galle => "Galle",
            District::Matara => "Matara",
            District::Hambantota => "Hambantota",
            District::Jaffna => "Jaffna",
            District::Kilinochchi => "Kilinochchi",
            District::Mannar => "Mannar",
            District::Vavuniya => "Vavuniya",
            District::Mullaitivu => "Mullaitivu",
            District::Batticaloa => "Batticaloa",
            District::Ampara => "Ampara",
            District::Trincomalee => "Trincomalee",
            District::Kurunegala => "Kurunegala",
            District::Puttalam => "Puttalam",
            District::Anuradhapura => "Anuradhapura",
            District::Polonnaruwa => "Polonnaruwa",
            District::Badulla => "Badulla",
            District::Monaragala => "Monaragala",
            District::Ratnapura => "Ratnapura",
            District::Kegalle => "Kegalle",
        }
    }

    /// All display names, for the presentation endpoint
    pub fn names() -> Vec<&'static str> {
        District::ALL.iter().map(District::as_str).collect()
    }
}

impl std::fmt::Display for District {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_district_count() {
        assert_eq!(District::ALL.len(), 25);
        assert_eq!(District::names().len(), 25);
    }

    #[test]
    fn test_district_from_str_exact_match() {
        assert_eq!(District::from_str("Colombo").unwrap(), District::Colombo);
        assert_eq!(
            District::from_str("Nuwara Eliya").unwrap(),
            District::NuwaraEliya
        );
    }

    #[test]
    fn test_district_from_str_case_sensitive() {
        assert!(District::from_str("colombo").is_err());
        assert!(District::from_str("COLOMBO").is_err());
    }

    #[test]
    fn test_district_from_str_unknown() {
        assert!(District::from_str("Atlantis").is_err());
        assert!(District::from_str("").is_err());
    }

    #[test]
    fn test_district_round_trip() {
        for district in District::ALL {
            assert_eq!(District::from_str(district.as_str()).unwrap(), district);
        }
    }

    #[test]
    fn test_district_serde_names() {
        let json = serde_json::to_string(&District::NuwaraEliya).unwrap();
        assert_eq!(json, "\"Nuwara Eliya\"");

        let district: District = serde_json::from_str("\"Kandy\"").unwrap();
        assert_eq!(district, District::Kandy);
    }
}
