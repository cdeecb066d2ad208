//! Overage invoices
//!
//! Invoices are created by the invoice store from an [`InvoiceDraft`]; the
//! store assigns identity, number and timestamps. After creation an invoice
//! only changes through an [`InvoicePatch`]:
//!
//! ```text
//! pending ──► paid        (terminal)
//!    │   └──► cancelled   (terminal)
//!    └──► overdue ──► paid / cancelled
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ContainerId, ContractId, InvoiceId, LineItemId, Money};

use crate::error::BillingError;
use crate::payment::PaymentMethod;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Issued and awaiting payment
    Pending,
    /// Payment captured
    Paid,
    /// Past the due date without payment
    Overdue,
    /// Voided by manual override
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Returns true if no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }

    /// Returns true if moving to `next` is a legal transition
    ///
    /// Re-asserting the current status is not a transition.
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        match (self, next) {
            (InvoiceStatus::Pending, InvoiceStatus::Paid)
            | (InvoiceStatus::Pending, InvoiceStatus::Overdue)
            | (InvoiceStatus::Pending, InvoiceStatus::Cancelled)
            | (InvoiceStatus::Overdue, InvoiceStatus::Paid)
            | (InvoiceStatus::Overdue, InvoiceStatus::Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(InvoiceStatus::Pending),
            "paid" => Ok(InvoiceStatus::Paid),
            "overdue" => Ok(InvoiceStatus::Overdue),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            other => Err(BillingError::Validation(format!("unknown invoice status: {}", other))),
        }
    }
}

/// A line on an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    pub id: LineItemId,
    pub description: String,
    /// Days charged
    pub quantity: Decimal,
    /// Per-diem rate
    pub unit_price: Money,
    /// `unit_price * quantity` at currency precision
    pub total: Money,
}

impl InvoiceLineItem {
    /// Creates a per-diem line for `days` days at `rate`
    pub fn per_diem(description: impl Into<String>, days: u32, rate: Money) -> Self {
        let quantity = Decimal::from(days);
        Self {
            id: LineItemId::new_v7(),
            description: description.into(),
            quantity,
            unit_price: rate,
            total: rate.times(quantity),
        }
    }
}

/// Everything needed to create an invoice; identity is assigned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub contract_id: ContractId,
    pub container_id: ContainerId,
    pub amount: Money,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub description: String,
    pub line_items: Vec<InvoiceLineItem>,
    /// Overage day index this invoice bills up to
    pub overage_day: u32,
    /// Number of overage days charged
    pub days_billed: u32,
    pub auto_billing: bool,
}

/// A per-diem overage invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Human-readable number
    pub invoice_number: String,
    pub contract_id: ContractId,
    pub container_id: ContainerId,
    /// Total charged, in the contract's settlement currency
    pub amount: Money,
    pub status: InvoiceStatus,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub description: String,
    pub line_items: Vec<InvoiceLineItem>,
    pub overage_day: u32,
    pub days_billed: u32,
    pub auto_billing: bool,
    /// Gateway order id once capture has been initiated
    pub payment_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub paid_at: Option<DateTime<Utc>>,
    /// Latest operator or gateway note
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Materializes a draft as a `pending` invoice
    pub fn from_draft(
        id: InvoiceId,
        invoice_number: impl Into<String>,
        draft: InvoiceDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            invoice_number: invoice_number.into(),
            contract_id: draft.contract_id,
            container_id: draft.container_id,
            amount: draft.amount,
            status: InvoiceStatus::Pending,
            invoice_date: draft.invoice_date,
            due_date: draft.due_date,
            description: draft.description,
            line_items: draft.line_items,
            overage_day: draft.overage_day,
            days_billed: draft.days_billed,
            auto_billing: draft.auto_billing,
            payment_id: None,
            payment_method: None,
            paid_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the invoice is still awaiting payment after `due_date`
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Pending && self.due_date < today
    }

    /// Applies `patch`, enforcing the status transition rules
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidStateTransition` if the patch would move
    /// the invoice along an illegal edge. Nothing is modified in that case.
    pub fn apply(&mut self, patch: InvoicePatch, now: DateTime<Utc>) -> Result<(), BillingError> {
        if let Some(next) = patch.status {
            if next != self.status && !self.status.can_transition_to(next) {
                return Err(BillingError::InvalidStateTransition {
                    invoice_id: self.id.to_string(),
                    from: self.status,
                    to: next,
                });
            }
            self.status = next;
        }
        if let Some(payment_id) = patch.payment_id {
            self.payment_id = Some(payment_id);
        }
        if let Some(method) = patch.payment_method {
            self.payment_method = Some(method);
        }
        if let Some(paid_at) = patch.paid_at {
            self.paid_at = Some(paid_at);
        }
        if let Some(note) = patch.note {
            self.notes = Some(note);
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Partial update to an invoice; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePatch {
    pub status: Option<InvoiceStatus>,
    pub payment_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub paid_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl InvoicePatch {
    /// Records an initiated capture order
    pub fn payment(order_id: impl Into<String>, method: PaymentMethod) -> Self {
        Self {
            payment_id: Some(order_id.into()),
            payment_method: Some(method),
            ..Default::default()
        }
    }

    /// Marks the invoice paid at `paid_at`
    pub fn paid(paid_at: DateTime<Utc>) -> Self {
        Self {
            status: Some(InvoiceStatus::Paid),
            paid_at: Some(paid_at),
            ..Default::default()
        }
    }

    /// Moves the invoice to `status`
    pub fn status(status: InvoiceStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Attaches a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn invoice() -> Invoice {
        let rate = Money::new(dec!(50.00), Currency::USD);
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let draft = InvoiceDraft {
            contract_id: ContractId::new(),
            container_id: ContainerId::new(),
            amount: rate,
            invoice_date: today,
            due_date: today.succ_opt().unwrap(),
            description: "Overage".to_string(),
            line_items: vec![InvoiceLineItem::per_diem("Per-diem overage", 1, rate)],
            overage_day: 2,
            days_billed: 1,
            auto_billing: false,
        };
        Invoice::from_draft(InvoiceId::new(), "INV-TEST-1", draft, Utc::now())
    }

    #[test]
    fn test_draft_becomes_pending() {
        let invoice = invoice();
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert!(invoice.payment_id.is_none());
        assert_eq!(invoice.line_items[0].total.amount(), dec!(50.00));
    }

    #[test]
    fn test_paid_is_terminal() {
        let mut invoice = invoice();
        invoice.apply(InvoicePatch::paid(Utc::now()), Utc::now()).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);

        let result = invoice.apply(InvoicePatch::status(InvoiceStatus::Cancelled), Utc::now());
        assert!(matches!(result, Err(BillingError::InvalidStateTransition { .. })));
        assert_eq!(invoice.status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_overdue_can_still_be_paid() {
        assert!(InvoiceStatus::Overdue.can_transition_to(InvoiceStatus::Paid));
        assert!(!InvoiceStatus::Overdue.can_transition_to(InvoiceStatus::Pending));
        assert!(!InvoiceStatus::Cancelled.can_transition_to(InvoiceStatus::Paid));
    }

    #[test]
    fn test_past_due_only_when_pending() {
        let invoice = invoice();
        assert!(!invoice.is_past_due(invoice.due_date));
        assert!(invoice.is_past_due(invoice.due_date.succ_opt().unwrap()));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&InvoiceStatus::Overdue).unwrap();
        assert_eq!(json, "\"overdue\"");
        assert_eq!("PAID".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Paid);
    }
}
