//! Collaborator Doubles
//!
//! Port implementations with scripted failures, for exercising the billing
//! runner's partial-success paths. Each wraps a real in-memory adapter and
//! only intercepts the calls it is told to break.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use core_kernel::{
    ContractId, DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, PortError,
};
use domain_billing::{
    CaptureOrder, CaptureOrderRequest, CaptureResult, InMemoryInvoiceStore, Invoice, InvoiceDraft,
    InvoicePatch, InvoicePort, InvoiceQuery, PaymentGateway, SandboxGateway,
};
use domain_lease::{ContractPort, LeaseContract};

/// Gateway that rejects capture orders for chosen contracts
///
/// Everything else is delegated to a [`SandboxGateway`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedGateway {
    inner: SandboxGateway,
    failing: Arc<Mutex<HashSet<ContractId>>>,
    fail_all: bool,
    requests: Arc<Mutex<Vec<CaptureOrderRequest>>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every capture order is refused
    pub fn unavailable() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Refuses capture orders for `contract_id`
    pub fn fail_for(self, contract_id: ContractId) -> Self {
        self.failing.lock().unwrap().insert(contract_id);
        self
    }

    /// Every capture order request received, in arrival order
    pub fn requests(&self) -> Vec<CaptureOrderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl DomainPort for ScriptedGateway {}

#[async_trait]
impl HealthCheckable for ScriptedGateway {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("scripted-gateway")
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn create_capture_order(&self, request: CaptureOrderRequest) -> Result<CaptureOrder, PortError> {
        self.requests.lock().unwrap().push(request.clone());
        let refused = self.fail_all || self.failing.lock().unwrap().contains(&request.contract_id);
        if refused {
            return Err(PortError::ServiceUnavailable {
                service: "scripted-gateway".to_string(),
            });
        }
        self.inner.create_capture_order(request).await
    }

    async fn capture_order(&self, order_id: &str) -> Result<CaptureResult, PortError> {
        self.inner.capture_order(order_id).await
    }
}

/// Invoice store that refuses to create invoices for chosen contracts, or
/// to update chosen invoices
#[derive(Debug, Clone, Default)]
pub struct FailingInvoiceStore {
    inner: InMemoryInvoiceStore,
    failing: Arc<Mutex<HashSet<ContractId>>>,
    failing_updates: Arc<Mutex<HashSet<InvoiceId>>>,
    create_calls: Arc<AtomicUsize>,
}

impl FailingInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses `create_invoice` for `contract_id`
    pub fn fail_for(self, contract_id: ContractId) -> Self {
        self.failing.lock().unwrap().insert(contract_id);
        self
    }

    /// Refuses `update_invoice` for `invoice_id`
    pub fn fail_update_for(&self, invoice_id: InvoiceId) {
        self.failing_updates.lock().unwrap().insert(invoice_id);
    }

    /// Number of `create_invoice` calls, successful or not
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

impl DomainPort for FailingInvoiceStore {}

#[async_trait]
impl HealthCheckable for FailingInvoiceStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("failing-invoice-store")
    }
}

#[async_trait]
impl InvoicePort for FailingInvoiceStore {
    async fn create_invoice(&self, draft: InvoiceDraft) -> Result<Invoice, PortError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&draft.contract_id) {
            return Err(PortError::connection("invoice store unreachable"));
        }
        self.inner.create_invoice(draft).await
    }

    async fn update_invoice(&self, id: InvoiceId, patch: InvoicePatch) -> Result<Invoice, PortError> {
        if self.failing_updates.lock().unwrap().contains(&id) {
            return Err(PortError::connection("invoice store unreachable"));
        }
        self.inner.update_invoice(id, patch).await
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        self.inner.get_invoice(id).await
    }

    async fn list_invoices(&self, query: InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
        self.inner.list_invoices(query).await
    }
}

/// Contract store whose listing always fails
#[derive(Debug, Clone, Default)]
pub struct UnreachableContractStore;

impl DomainPort for UnreachableContractStore {}

#[async_trait]
impl HealthCheckable for UnreachableContractStore {
    async fn health_check(&self) -> HealthCheckResult {
        let mut result = HealthCheckResult::healthy("unreachable-contracts");
        result.status = core_kernel::AdapterHealth::Unhealthy;
        result
    }
}

#[async_trait]
impl ContractPort for UnreachableContractStore {
    async fn list_contracts(&self) -> Result<Vec<LeaseContract>, PortError> {
        Err(PortError::connection("contract store unreachable"))
    }

    async fn get_contract(&self, _id: ContractId) -> Result<LeaseContract, PortError> {
        Err(PortError::connection("contract store unreachable"))
    }
}
