//! Request and response DTOs

pub mod billing;
pub mod calendar;
pub mod invoice;
