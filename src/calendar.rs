//! Day counting between calendar dates.
//!
//! All yield math uses the actual/365 convention: a period is the number of
//! whole calendar days between two dates, and a year is 365 of them.

use chrono::NaiveDate;

use crate::error::CalcError;

/// Days in the conventional year used for compounding and annualizing.
pub const DAYS_PER_YEAR: i64 = 365;

/// Whole calendar days from `start` to `end`.
pub fn elapsed_days(start: NaiveDate, end: NaiveDate) -> Result<i64, CalcError> {
    if end < start {
        return Err(CalcError::InvalidRange { start, end });
    }
    Ok((end - start).num_days())
}

/// True once `as_of` has reached the maturity date.
pub fn is_matured(maturity: NaiveDate, as_of: NaiveDate) -> bool {
    as_of >= maturity
}

/// Days left until maturity, zero once matured.
pub fn days_to_maturity(maturity: NaiveDate, as_of: NaiveDate) -> i64 {
    (maturity - as_of).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_elapsed_days_counts_calendar_days() {
        assert_eq!(elapsed_days(date(2025, 1, 1), date(2025, 1, 1)), Ok(0));
        assert_eq!(elapsed_days(date(2025, 1, 1), date(2025, 1, 31)), Ok(30));
        assert_eq!(elapsed_days(date(2023, 1, 1), date(2024, 1, 1)), Ok(365));
        // 2024 is a leap year
        assert_eq!(elapsed_days(date(2024, 1, 1), date(2025, 1, 1)), Ok(366));
    }

    #[test]
    fn test_elapsed_days_rejects_reversed_range() {
        let err = elapsed_days(date(2025, 2, 1), date(2025, 1, 1)).unwrap_err();
        assert_eq!(
            err,
            CalcError::InvalidRange {
                start: date(2025, 2, 1),
                end: date(2025, 1, 1),
            }
        );
    }

    #[test]
    fn test_is_matured_inclusive_of_maturity_day() {
        let maturity = date(2026, 6, 15);
        assert!(!is_matured(maturity, date(2026, 6, 14)));
        assert!(is_matured(maturity, date(2026, 6, 15)));
        assert!(is_matured(maturity, date(2027, 1, 1)));
    }

    #[test]
    fn test_days_to_maturity_saturates() {
        let maturity = date(2026, 6, 15);
        assert_eq!(days_to_maturity(maturity, date(2026, 6, 1)), 14);
        assert_eq!(days_to_maturity(maturity, date(2026, 7, 1)), 0);
    }
}
