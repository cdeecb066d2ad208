//! Core Kernel - Foundational types for the lease billing engine
//!
//! This crate provides the building blocks shared by the lease and billing
//! domains:
//! - Money with precise decimal arithmetic and half-up currency rounding
//! - Calendar-day arithmetic on `NaiveDate`
//! - Strongly-typed identifiers
//! - Port error and health types for the hexagonal seams

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{DateSpan, TemporalError, add_days, days_between};
pub use identifiers::{ContractId, ContainerId, InvoiceId, LineItemId, BillingRunId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
