//! Lease domain errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the lease domain
#[derive(Debug, Error)]
pub enum LeaseError {
    /// Contract terms failed validation
    #[error("Invalid contract terms: {0}")]
    Validation(String),

    /// The contract store failed
    #[error("Contract store error: {0}")]
    Store(#[from] PortError),

    /// A seed file could not be read or parsed
    #[error("Contract seed error: {0}")]
    Seed(String),
}

impl LeaseError {
    pub fn validation(message: impl Into<String>) -> Self {
        LeaseError::Validation(message.into())
    }
}
