//! Lease Domain - Container lease lifecycle
//!
//! Every leased container moves through the same lifecycle:
//!
//! ```text
//! start_date          start_date + free_days            end_date
//!     │── FREE_PERIOD ──────│── OVERAGE (per-diem) ──────────│── AVAILABLE
//! ```
//!
//! Status is derived on demand from the contract and an explicit reference
//! date, never read from storage. This crate provides:
//! - [`status::lease_status`] - the lifecycle state machine
//! - [`accrual`] - overage day counts and per-diem amounts
//! - [`calendar::project_events`] - display events for a date window
//! - [`ports::ContractPort`] - read access to the contract store
//!
//! # Example
//!
//! ```rust,ignore
//! let contract = LeaseContract::new(container, start, 10, Money::new(dec!(50), Currency::USD))?;
//! assert_eq!(contract.status(start + Days::new(12)), LeaseStatus::Overage);
//! assert_eq!(overage_days(&contract, start + Days::new(12)), 2);
//! ```

pub mod accrual;
pub mod calendar;
pub mod container;
pub mod contract;
pub mod error;
pub mod ports;
pub mod status;

pub use accrual::{accrued_total, overage_amount, overage_days};
pub use calendar::{project_events, CalendarEvent, CalendarFilters, OverageDetails};
pub use container::Container;
pub use contract::{ContractRecord, LeaseContract};
pub use error::LeaseError;
pub use ports::ContractPort;
pub use ports::memory::InMemoryContractStore;
pub use status::{lease_status, LeaseStatus};
