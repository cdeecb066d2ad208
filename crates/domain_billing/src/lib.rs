//! Billing Domain - Per-diem overage billing
//!
//! This crate turns lease contracts in overage into invoices and payment
//! capture requests, once per day:
//!
//! ```text
//! DailyBillingRunner ──spawn per contract──► InvoiceGenerator
//!        │                                     │        │
//!        │                               InvoicePort  PaymentGateway
//!        ▼
//!    EventBus ──► subscribers (SSE)
//! ```
//!
//! Payment confirmation arrives later through [`PaymentReconciler`], either
//! as a provider webhook or by polling open capture orders.
//!
//! # Example
//!
//! ```rust,ignore
//! let generator = InvoiceGenerator::new(invoices.clone(), gateway.clone())
//!     .with_policy(BillingPolicy::DeltaSinceLastBilled);
//! let runner = DailyBillingRunner::new(contracts, generator, EventBus::new());
//!
//! let result = runner.run_daily_billing(today).await?;
//! if result.is_partial_success() {
//!     tracing::warn!(failures = result.failures.len(), "Partial billing run");
//! }
//! ```

pub mod adapters;
pub mod error;
pub mod generator;
pub mod invoice;
pub mod notifier;
pub mod payment;
pub mod ports;
pub mod reconciliation;
pub mod runner;

pub use adapters::{SandboxGateway, SandboxGatewayConfig};
pub use error::BillingError;
pub use generator::{BillingPolicy, InvoiceGenerator, InvoiceOutcome, PaymentOutcome};
pub use invoice::{Invoice, InvoiceDraft, InvoiceLineItem, InvoicePatch, InvoiceStatus};
pub use notifier::{BillingEvent, EventBus, EventSubscriber};
pub use payment::{
    CaptureOrder, CaptureOrderRequest, CaptureResult, CaptureStatus, PaymentGateway, PaymentMethod,
    PaymentWebhook, WebhookEventType,
};
pub use ports::memory::InMemoryInvoiceStore;
pub use ports::{InvoicePort, InvoiceQuery};
pub use reconciliation::{PaymentReconciler, ReconciliationError, ReconciliationSummary, WebhookOutcome};
pub use runner::{BillingFailure, BillingRunResult, DailyBillingRunner, FailureStage};
