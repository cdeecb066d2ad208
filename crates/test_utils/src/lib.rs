//! Test Utilities Crate
//!
//! Shared test infrastructure for the lease billing workspace.
//!
//! # Modules
//!
//! - `fixtures`: Fixed dates, rates and containers
//! - `builders`: Builder for lease contracts with sensible defaults
//! - `doubles`: Scripted gateway and failing stores for fault-injection tests
//! - `assertions`: Assertion helpers for money and invoices
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod doubles;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use doubles::*;
pub use assertions::*;
pub use generators::*;
