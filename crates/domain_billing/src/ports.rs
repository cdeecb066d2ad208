//! Billing Domain Ports
//!
//! Invoice persistence is an external CRUD store. The engine creates invoices
//! from drafts, patches them as payment events arrive and queries them for
//! reconciliation; it never deletes.
//!
//! ```rust,ignore
//! let invoices: Arc<dyn InvoicePort> = Arc::new(InMemoryInvoiceStore::new());
//! let pending = invoices
//!     .list_invoices(InvoiceQuery::by_status(InvoiceStatus::Pending))
//!     .await?;
//! ```

use async_trait::async_trait;

use core_kernel::{ContractId, DomainPort, HealthCheckable, InvoiceId, PortError};

use crate::invoice::{Invoice, InvoiceDraft, InvoicePatch, InvoiceStatus};

/// Query parameters for listing invoices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceQuery {
    /// Filter by contract
    pub contract_id: Option<ContractId>,
    /// Filter by status
    pub status: Option<InvoiceStatus>,
    /// Filter by gateway order id
    pub payment_id: Option<String>,
    /// Limit results
    pub limit: Option<usize>,
    /// Offset for pagination
    pub offset: Option<usize>,
}

impl InvoiceQuery {
    /// Creates a query for one contract's invoices
    pub fn by_contract(contract_id: ContractId) -> Self {
        Self {
            contract_id: Some(contract_id),
            ..Default::default()
        }
    }

    /// Creates a query by status
    pub fn by_status(status: InvoiceStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Creates a query by gateway order id
    pub fn by_payment_id(payment_id: impl Into<String>) -> Self {
        Self {
            payment_id: Some(payment_id.into()),
            ..Default::default()
        }
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Returns true if `invoice` passes every present filter
    pub fn matches(&self, invoice: &Invoice) -> bool {
        if let Some(contract_id) = self.contract_id {
            if invoice.contract_id != contract_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if invoice.status != status {
                return false;
            }
        }
        if let Some(ref payment_id) = self.payment_id {
            if invoice.payment_id.as_ref() != Some(payment_id) {
                return false;
            }
        }
        true
    }
}

/// Port for invoice persistence
#[async_trait]
pub trait InvoicePort: DomainPort + HealthCheckable {
    /// Persists a draft as a new `pending` invoice and returns it
    async fn create_invoice(&self, draft: InvoiceDraft) -> Result<Invoice, PortError>;

    /// Applies a partial update
    ///
    /// Returns `PortError::Conflict` if the patch breaks a status rule
    async fn update_invoice(&self, id: InvoiceId, patch: InvoicePatch) -> Result<Invoice, PortError>;

    /// Retrieves an invoice by ID
    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    /// Lists invoices in creation order
    async fn list_invoices(&self, query: InvoiceQuery) -> Result<Vec<Invoice>, PortError>;
}

/// In-memory invoice store
pub mod memory {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    #[derive(Debug, Default)]
    struct Inner {
        invoices: Vec<Invoice>,
        next_number: u64,
    }

    /// Invoice store backed by a `Vec` behind an async lock
    ///
    /// Numbers are assigned sequentially per store as
    /// `INV-<invoice date>-<sequence>`.
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryInvoiceStore {
        inner: Arc<RwLock<Inner>>,
    }

    impl InMemoryInvoiceStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of invoices held
        pub async fn len(&self) -> usize {
            self.inner.read().await.invoices.len()
        }

        /// Returns true if no invoices have been created
        pub async fn is_empty(&self) -> bool {
            self.inner.read().await.invoices.is_empty()
        }
    }

    impl DomainPort for InMemoryInvoiceStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryInvoiceStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("memory-invoices")
        }
    }

    #[async_trait]
    impl InvoicePort for InMemoryInvoiceStore {
        async fn create_invoice(&self, draft: InvoiceDraft) -> Result<Invoice, PortError> {
            if draft.amount.is_negative() {
                return Err(PortError::validation_field(
                    "invoice amount must not be negative",
                    "amount",
                ));
            }

            let mut inner = self.inner.write().await;
            inner.next_number += 1;
            let number = format!(
                "INV-{}-{:06}",
                draft.invoice_date.format("%Y%m%d"),
                inner.next_number
            );
            let invoice = Invoice::from_draft(InvoiceId::new_v7(), number, draft, Utc::now());
            inner.invoices.push(invoice.clone());
            Ok(invoice)
        }

        async fn update_invoice(&self, id: InvoiceId, patch: InvoicePatch) -> Result<Invoice, PortError> {
            let mut inner = self.inner.write().await;
            let invoice = inner
                .invoices
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| PortError::not_found("Invoice", id))?;

            invoice
                .apply(patch, Utc::now())
                .map_err(|e| PortError::Conflict { message: e.to_string() })?;
            Ok(invoice.clone())
        }

        async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
            self.inner
                .read()
                .await
                .invoices
                .iter()
                .find(|i| i.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Invoice", id))
        }

        async fn list_invoices(&self, query: InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
            let inner = self.inner.read().await;
            let results = inner
                .invoices
                .iter()
                .filter(|i| query.matches(i))
                .skip(query.offset.unwrap_or(0))
                .take(query.limit.unwrap_or(usize::MAX))
                .cloned()
                .collect();
            Ok(results)
        }
    }
}
