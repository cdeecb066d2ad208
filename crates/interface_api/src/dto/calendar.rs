//! Calendar DTOs

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use core_kernel::{add_days, DateSpan};
use domain_lease::{CalendarFilters, LeaseStatus};

use crate::error::ApiError;

/// Query string for `GET /calendar`
///
/// Dates are `YYYY-MM-DD`. `as_of` overrides the date status is evaluated
/// at; it defaults to today.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CalendarQuery {
    #[validate(length(max = 128))]
    pub origin: Option<String>,
    #[validate(length(max = 128))]
    pub destination: Option<String>,
    #[validate(length(max = 32))]
    pub size: Option<String>,
    pub status: Option<String>,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub as_of: Option<NaiveDate>,
}

impl CalendarQuery {
    /// Builds the typed filters, rejecting unknown status names
    pub fn filters(&self) -> Result<CalendarFilters, ApiError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<LeaseStatus>)
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(CalendarFilters {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            size: self.size.clone(),
            status,
        })
    }

    /// Resolves the window, defaulting to `[today, today + default_days)`
    pub fn window(&self, today: NaiveDate, default_days: u64) -> Result<DateSpan, ApiError> {
        let start = self.window_start.unwrap_or(today);
        let end = self.window_end.unwrap_or_else(|| add_days(start, default_days));
        DateSpan::new(start, end).map_err(|e| ApiError::BadRequest(e.to_string()))
    }
}
