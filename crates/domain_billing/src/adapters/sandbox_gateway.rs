//! Sandbox payment gateway
//!
//! Mirrors the order lifecycle of a hosted-checkout provider:
//!
//! 1. `create_capture_order` returns an order id and an approval link
//! 2. the payer approves (implicit in the sandbox)
//! 3. `capture_order` moves the order to `COMPLETED`
//!
//! Orders live in memory for the lifetime of the adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, Money, PortError};

use crate::payment::{CaptureOrder, CaptureOrderRequest, CaptureResult, CaptureStatus, PaymentGateway};

const SERVICE: &str = "sandbox-gateway";

/// Configuration for the sandbox gateway
#[derive(Debug, Clone)]
pub struct SandboxGatewayConfig {
    /// Base URL approval links are built from
    pub approval_base_url: String,
}

impl Default for SandboxGatewayConfig {
    fn default() -> Self {
        Self {
            approval_base_url: "https://sandbox.payments.local".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct SandboxOrder {
    amount: Money,
    status: CaptureStatus,
}

/// Local stand-in for the hosted payment provider
#[derive(Debug, Clone)]
pub struct SandboxGateway {
    config: SandboxGatewayConfig,
    orders: Arc<RwLock<HashMap<String, SandboxOrder>>>,
    captures: Arc<AtomicU64>,
}

impl SandboxGateway {
    /// Creates a sandbox gateway
    pub fn new(config: SandboxGatewayConfig) -> Self {
        Self {
            config,
            orders: Arc::new(RwLock::new(HashMap::new())),
            captures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of orders captured so far
    pub fn capture_count(&self) -> u64 {
        self.captures.load(Ordering::Relaxed)
    }

    fn approval_link(&self, order_id: &str) -> String {
        format!(
            "{}/checkoutnow?token={}",
            self.config.approval_base_url.trim_end_matches('/'),
            order_id
        )
    }
}

impl Default for SandboxGateway {
    fn default() -> Self {
        Self::new(SandboxGatewayConfig::default())
    }
}

impl DomainPort for SandboxGateway {}

#[async_trait]
impl HealthCheckable for SandboxGateway {
    async fn health_check(&self) -> HealthCheckResult {
        let mut result = HealthCheckResult::healthy(SERVICE);
        result.message = Some(format!("{} open orders", self.orders.read().await.len()));
        result
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn create_capture_order(&self, request: CaptureOrderRequest) -> Result<CaptureOrder, PortError> {
        if !request.amount.is_positive() {
            return Err(PortError::rejected(
                SERVICE,
                format!("amount must be positive, got {}", request.amount),
            ));
        }

        let order_id = format!("SBX-{}", Uuid::new_v4().simple());
        self.orders.write().await.insert(
            order_id.clone(),
            SandboxOrder {
                amount: request.amount,
                status: CaptureStatus::Created,
            },
        );

        tracing::debug!(
            order_id = %order_id,
            invoice_id = %request.invoice_id,
            amount = %request.amount,
            "Sandbox capture order created"
        );

        Ok(CaptureOrder {
            approval_link: Some(self.approval_link(&order_id)),
            order_id,
            status: CaptureStatus::Created,
        })
    }

    async fn capture_order(&self, order_id: &str) -> Result<CaptureResult, PortError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| PortError::not_found("CaptureOrder", order_id))?;

        if order.status != CaptureStatus::Completed {
            order.status = CaptureStatus::Completed;
            self.captures.fetch_add(1, Ordering::Relaxed);
        }

        Ok(CaptureResult {
            order_id: order_id.to_string(),
            status: order.status,
            captured_amount: Some(order.amount),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{ContractId, Currency, InvoiceId};
    use rust_decimal_macros::dec;

    fn request(amount: Money) -> CaptureOrderRequest {
        CaptureOrderRequest {
            invoice_id: InvoiceId::new(),
            contract_id: ContractId::new(),
            amount,
            description: "INV-1 - overage".to_string(),
        }
    }

    #[tokio::test]
    async fn test_order_then_capture() {
        let gateway = SandboxGateway::default();
        let order = gateway
            .create_capture_order(request(Money::new(dec!(50.00), Currency::USD)))
            .await
            .unwrap();

        assert!(order.order_id.starts_with("SBX-"));
        assert!(order.approval_link.unwrap().ends_with(&order.order_id));

        let first = gateway.capture_order(&order.order_id).await.unwrap();
        let replay = gateway.capture_order(&order.order_id).await.unwrap();
        assert_eq!(first.status, CaptureStatus::Completed);
        assert_eq!(replay.status, CaptureStatus::Completed);
        assert_eq!(gateway.capture_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_amount_rejected() {
        let gateway = SandboxGateway::default();
        let result = gateway
            .create_capture_order(request(Money::zero(Currency::USD)))
            .await;
        assert!(matches!(result, Err(PortError::Rejected { .. })));
    }

    #[tokio::test]
    async fn test_unknown_order_not_found() {
        let gateway = SandboxGateway::default();
        assert!(gateway.capture_order("SBX-missing").await.unwrap_err().is_not_found());
    }
}
