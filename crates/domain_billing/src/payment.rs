//! Payment capture
//!
//! Capture goes through an external provider behind [`PaymentGateway`]. The
//! engine only creates capture orders and asks for their outcome; approval
//! and settlement happen on the provider side and come back as webhooks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ContractId, DomainPort, HealthCheckable, InvoiceId, Money, PortError};

use crate::error::BillingError;
use crate::invoice::Invoice;

/// Payment method recorded on an invoice once capture is initiated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Hosted wallet checkout (approval link)
    #[default]
    Wallet,
    /// Card on file
    Card,
    /// Bank transfer
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wallet" => Ok(PaymentMethod::Wallet),
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(BillingError::Validation(format!("unknown payment method: {}", other))),
        }
    }
}

/// Provider-side state of a capture order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaptureStatus {
    /// Order created, awaiting payer approval
    Created,
    /// Payer approved, funds not yet captured
    Approved,
    /// Funds captured
    Completed,
    /// Provider declined the capture
    Denied,
}

/// Request to open a capture order for an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOrderRequest {
    pub invoice_id: InvoiceId,
    pub contract_id: ContractId,
    /// Amount at currency precision, in the invoice's currency
    pub amount: Money,
    pub description: String,
}

impl CaptureOrderRequest {
    /// Builds the request for the full invoice amount
    pub fn for_invoice(invoice: &Invoice) -> Self {
        Self {
            invoice_id: invoice.id,
            contract_id: invoice.contract_id,
            amount: invoice.amount.round_to_currency(),
            description: format!("{} - {}", invoice.invoice_number, invoice.description),
        }
    }
}

/// A capture order opened with the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureOrder {
    /// Provider order id; stored on the invoice as `payment_id`
    pub order_id: String,
    /// Where the payer approves the order, if the provider needs approval
    pub approval_link: Option<String>,
    pub status: CaptureStatus,
}

/// Outcome of a capture attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureResult {
    pub order_id: String,
    pub status: CaptureStatus,
    pub captured_amount: Option<Money>,
}

/// Port to the external payment provider
#[async_trait]
pub trait PaymentGateway: DomainPort + HealthCheckable {
    /// Opens a capture order for `request.amount`
    async fn create_capture_order(&self, request: CaptureOrderRequest) -> Result<CaptureOrder, PortError>;

    /// Attempts to capture a previously created order
    ///
    /// Capturing an already-captured order reports `Completed` again.
    async fn capture_order(&self, order_id: &str) -> Result<CaptureResult, PortError>;
}

/// Webhook event kinds sent by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookEventType {
    CaptureCompleted,
    CaptureDenied,
    #[serde(other)]
    Unknown,
}

/// Inbound provider notification about a capture order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentWebhook {
    pub event_type: WebhookEventType,
    /// Provider order id, matched against `Invoice::payment_id`
    pub payment_id: String,
    #[serde(default)]
    pub captured_amount: Option<Money>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_webhook_event_type_deserializes() {
        let webhook: PaymentWebhook = serde_json::from_str(
            r#"{"event_type": "CHECKOUT_ORDER_VOIDED", "payment_id": "SBX-1"}"#,
        )
        .unwrap();
        assert_eq!(webhook.event_type, WebhookEventType::Unknown);
        assert!(webhook.captured_amount.is_none());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("Card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert!("cheque".parse::<PaymentMethod>().is_err());
        assert_eq!(PaymentMethod::default(), PaymentMethod::Wallet);
    }
}
