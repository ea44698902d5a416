//! Age derivation against the fixed reference date
//!
//! Ages are computed as of a fixed cohort snapshot date, not the wall clock.
//! The system models student ages as of the first day of 2025; using
//! `Utc::now()` here would silently change every stored age over time.

use chrono::{Datelike, NaiveDate};

/// Fixed reference date for all age calculations: 2025-01-01
pub fn reference_date() -> NaiveDate {
    // from_ymd_opt only fails on out-of-range dates
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid reference date")
}

/// Whole-number age at the reference date
///
/// `age = reference year - birth year`, minus one when the birthday has not
/// yet occurred in the reference year.
pub fn age_at_reference(birth_date: NaiveDate) -> i32 {
    age_at(birth_date, reference_date())
}

fn age_at(birth_date: NaiveDate, reference: NaiveDate) -> i32 {
    let mut age = reference.year() - birth_date.year();
    if (birth_date.month(), birth_date.day()) > (reference.month(), reference.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reference_date_is_pinned() {
        // The reference date is a constant, not the wall clock
        assert_eq!(reference_date(), date(2025, 1, 1));
    }

    #[test]
    fn test_exact_birthday_on_reference() {
        // Born 2007-01-01: birthday falls exactly on the reference date
        assert_eq!(age_at_reference(date(2007, 1, 1)), 18);
    }

    #[test]
    fn test_birthday_not_yet_reached() {
        // One calendar day later: the 18th birthday has not yet occurred
        assert_eq!(age_at_reference(date(2007, 1, 2)), 17);
    }

    #[test]
    fn test_late_year_birthday() {
        assert_eq!(age_at_reference(date(2000, 12, 31)), 24);
    }

    #[test]
    fn test_age_at_mid_year_reference() {
        let reference = date(2025, 6, 15);
        assert_eq!(age_at(date(2000, 6, 15), reference), 25);
        assert_eq!(age_at(date(2000, 6, 16), reference), 24);
        assert_eq!(age_at(date(2000, 6, 14), reference), 25);
    }

    #[test]
    fn test_leap_day_birth() {
        // Feb 29 birthday has not occurred by Jan 1
        assert_eq!(age_at_reference(date(2008, 2, 29)), 16);
    }
}
