//! Calendar-day arithmetic
//!
//! Lease lifecycles are tracked in whole calendar days. Everything here works
//! on `NaiveDate` so that time-of-day can never shift a boundary.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid span: start {start} must not be after end {end}")]
    InvalidSpan {
        start: String,
        end: String,
    },
}

/// Adds `days` calendar days to `date`, saturating at the maximum date
pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Returns the signed number of whole days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// A half-open range of calendar days, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    /// First day covered (inclusive)
    pub start: NaiveDate,
    /// First day no longer covered (exclusive)
    pub end: NaiveDate,
}

impl DateSpan {
    /// Creates a span, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidSpan {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Creates a span without ordering checks
    ///
    /// Display projections keep whatever the contract data implies, even
    /// when a window ends before the span would start.
    pub fn unchecked(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_add_days_crosses_month_and_leap_day() {
        assert_eq!(add_days(d(2024, 2, 25), 5), d(2024, 3, 1));
        assert_eq!(add_days(d(2023, 2, 25), 5), d(2023, 3, 2));
    }

    #[test]
    fn test_add_days_saturates() {
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
    }

    #[test]
    fn test_days_between_is_signed() {
        assert_eq!(days_between(d(2024, 1, 1), d(2024, 1, 11)), 10);
        assert_eq!(days_between(d(2024, 1, 11), d(2024, 1, 1)), -10);
    }

    #[test]
    fn test_span_allows_empty_range() {
        let span = DateSpan::new(d(2024, 1, 1), d(2024, 1, 1)).unwrap();
        assert_eq!(span.start, span.end);
    }

    #[test]
    fn test_span_rejects_inverted_range() {
        let result = DateSpan::new(d(2024, 2, 1), d(2024, 1, 1));
        assert!(matches!(result, Err(TemporalError::InvalidSpan { .. })));
    }

    #[test]
    fn test_unchecked_keeps_inverted_range() {
        let span = DateSpan::unchecked(d(2024, 2, 1), d(2024, 1, 1));
        assert!(span.start > span.end);
    }
}
