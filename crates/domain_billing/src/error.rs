//! Billing domain errors

use thiserror::Error;

use core_kernel::PortError;
use domain_lease::LeaseError;

use crate::invoice::InvoiceStatus;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// The invoice store failed
    #[error("Invoice store error: {0}")]
    Store(#[source] PortError),

    /// The payment gateway failed or declined
    #[error("Payment gateway error: {0}")]
    Gateway(#[source] PortError),

    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// The requested status change is not allowed
    #[error("Invalid invoice transition for {invoice_id}: {from} -> {to}")]
    InvalidStateTransition {
        invoice_id: String,
        from: InvoiceStatus,
        to: InvoiceStatus,
    },

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Lease domain failure, including contract store errors
    #[error(transparent)]
    Lease(#[from] LeaseError),
}

impl BillingError {
    /// Maps a store lookup error, turning `NotFound` into `InvoiceNotFound`
    pub fn from_lookup(error: PortError) -> Self {
        match error {
            PortError::NotFound { id, .. } => BillingError::InvoiceNotFound(id),
            other => BillingError::Store(other),
        }
    }
}
