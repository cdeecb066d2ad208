//! Request handlers

pub mod billing;
pub mod calendar;
pub mod events;
pub mod health;
pub mod invoices;
pub mod webhooks;

use chrono::{NaiveDate, Utc};

/// The business date requests default to
///
/// The domain crates never read the clock; every "today" they see comes
/// from here or from the request.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
