//! Payment reconciliation
//!
//! Brings invoice state in line with what the payment provider knows:
//! - webhooks confirm or deny captures
//! - `reconcile_pending` polls open orders and retries capture for
//!   auto-billing invoices that never got one; overdue invoices are still
//!   open and are swept too
//! - `mark_overdue` flags pending invoices past their due date
//! - `cancel_invoice` is the manual override

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use core_kernel::InvoiceId;

use crate::error::BillingError;
use crate::generator::{InvoiceGenerator, PaymentOutcome};
use crate::invoice::{Invoice, InvoicePatch, InvoiceStatus};
use crate::notifier::{BillingEvent, EventBus};
use crate::payment::{CaptureStatus, PaymentGateway, PaymentWebhook, WebhookEventType};
use crate::ports::{InvoicePort, InvoiceQuery};

/// What a webhook did to its invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "invoice", rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// Invoice moved to `paid`
    MarkedPaid(Invoice),
    /// Invoice was already `paid`; nothing changed
    AlreadyPaid(Invoice),
    /// Denial recorded as a note; invoice left as it was
    Noted(Invoice),
    /// Event type the engine does not act on
    Ignored,
}

/// A per-invoice error collected during a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationError {
    pub invoice_id: InvoiceId,
    pub message: String,
}

/// Outcome of a reconciliation sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Invoices examined
    pub checked: usize,
    /// Invoices whose capture completed during the sweep
    pub paid: Vec<InvoiceId>,
    /// Auto-billing invoices that got a new capture order
    pub capture_requested: Vec<InvoiceId>,
    /// Invoices moved to `overdue`
    pub overdue: Vec<InvoiceId>,
    pub errors: Vec<ReconciliationError>,
}

/// Reconciles invoices against the payment provider
#[derive(Clone)]
pub struct PaymentReconciler {
    invoices: Arc<dyn InvoicePort>,
    gateway: Arc<dyn PaymentGateway>,
    generator: InvoiceGenerator,
    notifier: EventBus,
}

impl PaymentReconciler {
    /// `generator` is reused to retry capture with the configured payment method
    pub fn new(
        invoices: Arc<dyn InvoicePort>,
        gateway: Arc<dyn PaymentGateway>,
        generator: InvoiceGenerator,
        notifier: EventBus,
    ) -> Self {
        Self {
            invoices,
            gateway,
            generator,
            notifier,
        }
    }

    /// Applies a provider webhook
    ///
    /// Replaying a `CAPTURE_COMPLETED` for an invoice that is already paid is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvoiceNotFound` if no invoice carries the
    /// webhook's payment id, and `InvalidStateTransition` for a capture on a
    /// cancelled invoice.
    pub async fn handle_webhook(&self, webhook: PaymentWebhook) -> Result<WebhookOutcome, BillingError> {
        if webhook.event_type == WebhookEventType::Unknown {
            tracing::debug!(payment_id = %webhook.payment_id, "Ignoring unhandled webhook event");
            return Ok(WebhookOutcome::Ignored);
        }

        let invoice = self.find_by_payment_id(&webhook.payment_id).await?;

        match webhook.event_type {
            WebhookEventType::CaptureCompleted => {
                if invoice.status == InvoiceStatus::Paid {
                    tracing::debug!(invoice_id = %invoice.id, "Capture webhook replayed, already paid");
                    return Ok(WebhookOutcome::AlreadyPaid(invoice));
                }
                if let Some(captured) = webhook.captured_amount {
                    if captured != invoice.amount.round_to_currency() {
                        tracing::warn!(
                            invoice_id = %invoice.id,
                            expected = %invoice.amount,
                            captured = %captured,
                            "Captured amount differs from invoice amount"
                        );
                    }
                }
                let paid = self.mark_paid(invoice).await?;
                Ok(WebhookOutcome::MarkedPaid(paid))
            }
            WebhookEventType::CaptureDenied => {
                if invoice.status.is_terminal() {
                    return Ok(WebhookOutcome::Ignored);
                }
                let patch = InvoicePatch::default()
                    .with_note(format!("Capture denied for order {}", webhook.payment_id));
                let noted = self
                    .invoices
                    .update_invoice(invoice.id, patch)
                    .await
                    .map_err(BillingError::Store)?;
                tracing::warn!(invoice_id = %noted.id, payment_id = %webhook.payment_id, "Capture denied");
                Ok(WebhookOutcome::Noted(noted))
            }
            WebhookEventType::Unknown => Ok(WebhookOutcome::Ignored),
        }
    }

    /// Polls open capture orders and retries missing ones
    ///
    /// Sweeps every unpaid invoice, `pending` or `overdue`. Per-invoice errors
    /// are collected in the summary and never stop the sweep.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Store` only if open invoices cannot be listed.
    pub async fn reconcile_pending(&self) -> Result<ReconciliationSummary, BillingError> {
        let open = self.open_invoices().await?;

        let mut summary = ReconciliationSummary {
            checked: open.len(),
            ..Default::default()
        };

        for invoice in open {
            let invoice_id = invoice.id;
            match invoice.payment_id.clone() {
                Some(order_id) => match self.gateway.capture_order(&order_id).await {
                    Ok(capture) if capture.status == CaptureStatus::Completed => {
                        match self.mark_paid(invoice).await {
                            Ok(_) => summary.paid.push(invoice_id),
                            Err(e) => summary.errors.push(ReconciliationError {
                                invoice_id,
                                message: e.to_string(),
                            }),
                        }
                    }
                    Ok(capture) => {
                        tracing::debug!(invoice_id = %invoice_id, status = ?capture.status, "Capture still open");
                    }
                    Err(e) => summary.errors.push(ReconciliationError {
                        invoice_id,
                        message: BillingError::Gateway(e).to_string(),
                    }),
                },
                None if invoice.auto_billing => {
                    let outcome = self.generator.initiate_capture(invoice).await;
                    match outcome.payment {
                        PaymentOutcome::Initiated { .. } => summary.capture_requested.push(invoice_id),
                        PaymentOutcome::Failed { message } => {
                            summary.errors.push(ReconciliationError { invoice_id, message })
                        }
                        PaymentOutcome::NotRequested => {}
                    }
                }
                None => {}
            }
        }

        tracing::info!(
            checked = summary.checked,
            paid = summary.paid.len(),
            capture_requested = summary.capture_requested.len(),
            errors = summary.errors.len(),
            "Open invoices reconciled"
        );

        Ok(summary)
    }

    /// Moves `pending` invoices whose due date is before `today` to `overdue`
    ///
    /// Only `checked`, `overdue` and `errors` are filled in. A failed update
    /// is recorded and the sweep moves on.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Store` only if pending invoices cannot be listed.
    pub async fn mark_overdue(&self, today: NaiveDate) -> Result<ReconciliationSummary, BillingError> {
        let pending = self
            .invoices
            .list_invoices(InvoiceQuery::by_status(InvoiceStatus::Pending))
            .await
            .map_err(BillingError::Store)?;

        let mut summary = ReconciliationSummary {
            checked: pending.len(),
            ..Default::default()
        };

        for invoice in pending.into_iter().filter(|i| i.is_past_due(today)) {
            match self
                .invoices
                .update_invoice(invoice.id, InvoicePatch::status(InvoiceStatus::Overdue))
                .await
            {
                Ok(updated) => summary.overdue.push(updated.id),
                Err(e) => {
                    tracing::warn!(invoice_id = %invoice.id, error = %e, "Could not mark invoice overdue");
                    summary.errors.push(ReconciliationError {
                        invoice_id: invoice.id,
                        message: BillingError::Store(e).to_string(),
                    });
                }
            }
        }

        if !summary.overdue.is_empty() {
            tracing::info!(count = summary.overdue.len(), %today, "Invoices marked overdue");
        }
        Ok(summary)
    }

    /// Full sweep: poll and retry captures, then flag overdue invoices
    pub async fn reconcile(&self, today: NaiveDate) -> Result<ReconciliationSummary, BillingError> {
        let mut summary = self.reconcile_pending().await?;
        let sweep = self.mark_overdue(today).await?;
        summary.overdue = sweep.overdue;
        summary.errors.extend(sweep.errors);
        Ok(summary)
    }

    /// Manually cancels an invoice
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` for `paid` or already `cancelled`
    /// invoices.
    pub async fn cancel_invoice(&self, id: InvoiceId, reason: &str) -> Result<Invoice, BillingError> {
        let invoice = self
            .invoices
            .get_invoice(id)
            .await
            .map_err(BillingError::from_lookup)?;

        if !invoice.status.can_transition_to(InvoiceStatus::Cancelled) {
            return Err(BillingError::InvalidStateTransition {
                invoice_id: id.to_string(),
                from: invoice.status,
                to: InvoiceStatus::Cancelled,
            });
        }

        let cancelled = self
            .invoices
            .update_invoice(id, InvoicePatch::status(InvoiceStatus::Cancelled).with_note(reason))
            .await
            .map_err(BillingError::Store)?;

        tracing::info!(invoice_id = %id, reason, "Invoice cancelled");
        Ok(cancelled)
    }

    /// Unpaid invoices, `pending` first
    async fn open_invoices(&self) -> Result<Vec<Invoice>, BillingError> {
        let mut open = Vec::new();
        for status in [InvoiceStatus::Pending, InvoiceStatus::Overdue] {
            let batch = self
                .invoices
                .list_invoices(InvoiceQuery::by_status(status))
                .await
                .map_err(BillingError::Store)?;
            open.extend(batch);
        }
        Ok(open)
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Invoice, BillingError> {
        self.invoices
            .list_invoices(InvoiceQuery::by_payment_id(payment_id).paginate(1, 0))
            .await
            .map_err(BillingError::Store)?
            .into_iter()
            .next()
            .ok_or_else(|| BillingError::InvoiceNotFound(format!("payment {}", payment_id)))
    }

    async fn mark_paid(&self, invoice: Invoice) -> Result<Invoice, BillingError> {
        if !invoice.status.can_transition_to(InvoiceStatus::Paid) {
            return Err(BillingError::InvalidStateTransition {
                invoice_id: invoice.id.to_string(),
                from: invoice.status,
                to: InvoiceStatus::Paid,
            });
        }

        let paid = self
            .invoices
            .update_invoice(invoice.id, InvoicePatch::paid(Utc::now()))
            .await
            .map_err(BillingError::Store)?;

        tracing::info!(
            invoice_id = %paid.id,
            contract_id = %paid.contract_id,
            amount = %paid.amount,
            "Invoice paid"
        );

        self.notifier.broadcast(BillingEvent::InvoicePaid {
            invoice_id: paid.id,
            contract_id: paid.contract_id,
            payment_id: paid.payment_id.clone().unwrap_or_default(),
        });

        Ok(paid)
    }
}
