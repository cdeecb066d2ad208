//! Invoice generation for contracts in overage
//!
//! One call bills one contract for one day. The invoice is persisted before
//! any payment call is made, and a failed capture never rolls it back: the
//! invoice stays `pending` without a `payment_id` and reconciliation retries
//! the capture later.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use core_kernel::add_days;
use domain_lease::{overage_amount, overage_days, LeaseContract, LeaseStatus};

use crate::error::BillingError;
use crate::invoice::{Invoice, InvoiceDraft, InvoiceLineItem, InvoicePatch};
use crate::payment::{CaptureOrder, CaptureOrderRequest, PaymentGateway, PaymentMethod};
use crate::ports::{InvoicePort, InvoiceQuery};

/// How much a single billing invocation charges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPolicy {
    /// One day's per-diem on every invocation
    ///
    /// Running twice on the same day bills the same day twice.
    #[default]
    FlatDailyIncrement,
    /// Every overage day not yet covered by an earlier invoice
    DeltaSinceLastBilled,
}

impl BillingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPolicy::FlatDailyIncrement => "flat_daily_increment",
            BillingPolicy::DeltaSinceLastBilled => "delta_since_last_billed",
        }
    }
}

impl fmt::Display for BillingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingPolicy {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "flat_daily_increment" | "flat" => Ok(BillingPolicy::FlatDailyIncrement),
            "delta_since_last_billed" | "delta" => Ok(BillingPolicy::DeltaSinceLastBilled),
            other => Err(BillingError::Validation(format!("unknown billing policy: {}", other))),
        }
    }
}

/// What happened on the payment side of an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// Contract is not on auto-billing
    NotRequested,
    /// Capture order opened and recorded on the invoice
    Initiated { order: CaptureOrder },
    /// Capture could not be initiated; the invoice is still pending
    Failed { message: String },
}

/// Result of billing one contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceOutcome {
    pub invoice: Invoice,
    pub payment: PaymentOutcome,
}

/// Creates overage invoices and initiates payment capture
#[derive(Clone)]
pub struct InvoiceGenerator {
    invoices: Arc<dyn InvoicePort>,
    gateway: Arc<dyn PaymentGateway>,
    policy: BillingPolicy,
    payment_method: PaymentMethod,
}

impl InvoiceGenerator {
    /// Creates a generator with the default policy and payment method
    pub fn new(invoices: Arc<dyn InvoicePort>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            invoices,
            gateway,
            policy: BillingPolicy::default(),
            payment_method: PaymentMethod::default(),
        }
    }

    /// Sets the billing policy
    pub fn with_policy(mut self, policy: BillingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the payment method recorded when capture is initiated
    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    pub fn policy(&self) -> BillingPolicy {
        self.policy
    }

    /// Bills `contract` as of `today`
    ///
    /// Returns `Ok(None)` when the contract is not in overage or nothing is
    /// owed under the active policy.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Store` if the invoice cannot be created. Payment
    /// failures are reported in the outcome, not as an error.
    pub async fn generate_invoice(
        &self,
        contract: &LeaseContract,
        today: NaiveDate,
    ) -> Result<Option<InvoiceOutcome>, BillingError> {
        let status = contract.status(today);
        if status != LeaseStatus::Overage {
            tracing::debug!(contract_id = %contract.id, %status, "Contract not in overage, skipping");
            return Ok(None);
        }

        let days = overage_days(contract, today);
        let days_billed = match self.policy {
            BillingPolicy::FlatDailyIncrement => 1,
            BillingPolicy::DeltaSinceLastBilled => {
                let last_billed = self.last_billed_day(contract).await?;
                days.saturating_sub(last_billed)
            }
        };

        let amount = overage_amount(contract.per_diem_rate, days_billed);
        if days_billed == 0 || amount.is_zero() {
            tracing::debug!(
                contract_id = %contract.id,
                overage_days = days,
                policy = %self.policy,
                "Nothing owed, skipping"
            );
            return Ok(None);
        }

        let draft = InvoiceDraft {
            contract_id: contract.id,
            container_id: contract.container.id,
            amount,
            invoice_date: today,
            due_date: add_days(today, 1),
            description: format!(
                "Per-diem overage for contract {} (container {}), overage day {}",
                contract.id, contract.container.container_number, days
            ),
            line_items: vec![InvoiceLineItem::per_diem(
                format!("Per-diem overage, {} day(s)", days_billed),
                days_billed,
                contract.per_diem_rate,
            )],
            overage_day: days,
            days_billed,
            auto_billing: contract.auto_billing,
        };

        let invoice = self
            .invoices
            .create_invoice(draft)
            .await
            .map_err(BillingError::Store)?;

        tracing::info!(
            contract_id = %contract.id,
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            amount = %invoice.amount,
            overage_day = days,
            "Overage invoice created"
        );

        if !contract.auto_billing {
            return Ok(Some(InvoiceOutcome {
                invoice,
                payment: PaymentOutcome::NotRequested,
            }));
        }

        Ok(Some(self.initiate_capture(invoice).await))
    }

    /// Opens a capture order for `invoice` and records it
    ///
    /// Never fails: a gateway or store error leaves the invoice as it was and
    /// is reported as `PaymentOutcome::Failed`.
    pub async fn initiate_capture(&self, invoice: Invoice) -> InvoiceOutcome {
        let order = match self
            .gateway
            .create_capture_order(CaptureOrderRequest::for_invoice(&invoice))
            .await
        {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(
                    invoice_id = %invoice.id,
                    contract_id = %invoice.contract_id,
                    error = %e,
                    "Payment capture could not be initiated"
                );
                return InvoiceOutcome {
                    invoice,
                    payment: PaymentOutcome::Failed {
                        message: BillingError::Gateway(e).to_string(),
                    },
                };
            }
        };

        let patch = InvoicePatch::payment(order.order_id.clone(), self.payment_method);
        match self.invoices.update_invoice(invoice.id, patch).await {
            Ok(updated) => {
                tracing::info!(
                    invoice_id = %updated.id,
                    order_id = %order.order_id,
                    "Payment capture initiated"
                );
                InvoiceOutcome {
                    invoice: updated,
                    payment: PaymentOutcome::Initiated { order },
                }
            }
            Err(e) => {
                tracing::warn!(
                    invoice_id = %invoice.id,
                    order_id = %order.order_id,
                    error = %e,
                    "Capture order opened but not recorded on invoice"
                );
                InvoiceOutcome {
                    invoice,
                    payment: PaymentOutcome::Failed {
                        message: format!(
                            "capture order {} opened but invoice update failed: {}",
                            order.order_id, e
                        ),
                    },
                }
            }
        }
    }

    /// Highest overage day already invoiced for `contract`, zero if none
    async fn last_billed_day(&self, contract: &LeaseContract) -> Result<u32, BillingError> {
        let invoices = self
            .invoices
            .list_invoices(InvoiceQuery::by_contract(contract.id))
            .await
            .map_err(BillingError::Store)?;
        Ok(invoices.iter().map(|i| i.overage_day).max().unwrap_or(0))
    }
}

impl fmt::Debug for InvoiceGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvoiceGenerator")
            .field("policy", &self.policy)
            .field("payment_method", &self.payment_method)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!("delta".parse::<BillingPolicy>().unwrap(), BillingPolicy::DeltaSinceLastBilled);
        assert_eq!(
            "Flat-Daily-Increment".parse::<BillingPolicy>().unwrap(),
            BillingPolicy::FlatDailyIncrement
        );
        assert!("weekly".parse::<BillingPolicy>().is_err());
    }

    #[test]
    fn test_default_policy_is_flat() {
        assert_eq!(BillingPolicy::default(), BillingPolicy::FlatDailyIncrement);
    }
}
