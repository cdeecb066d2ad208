//! Real-time billing notifications
//!
//! Fire-and-forget fan-out over a bounded tokio broadcast channel. Having no
//! subscribers is normal. A slow subscriber skips what it missed and never
//! blocks the sender.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use core_kernel::{ContractId, InvoiceId};

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 256;

/// Events published to billing subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BillingEvent {
    /// A daily billing run finished
    BillingRunCompleted {
        run_date: NaiveDate,
        message: String,
        processed_count: usize,
        generated_count: usize,
        failure_count: usize,
        completed_at: DateTime<Utc>,
    },
    /// A capture was confirmed and the invoice settled
    InvoicePaid {
        invoice_id: InvoiceId,
        contract_id: ContractId,
        payment_id: String,
    },
}

impl BillingEvent {
    /// Event name, used as the SSE event field
    pub fn event_type(&self) -> &'static str {
        match self {
            BillingEvent::BillingRunCompleted { .. } => "billing_run_completed",
            BillingEvent::InvoicePaid { .. } => "invoice_paid",
        }
    }
}

/// Event bus for broadcasting billing events to all subscribers
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BillingEvent>,
    subscriber_count: Arc<AtomicUsize>,
}

impl EventBus {
    /// Creates an event bus with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an event bus with a custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            subscriber_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Publishes an event to every current subscriber
    ///
    /// Returns the number of subscribers that received it.
    pub fn broadcast(&self, event: BillingEvent) -> usize {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(count) => {
                tracing::debug!(event_type, subscribers = count, "Billing event published");
                count
            }
            Err(_) => {
                tracing::debug!(event_type, "Billing event published (no subscribers)");
                0
            }
        }
    }

    /// Subscribes to all events published from now on
    pub fn subscribe(&self) -> EventSubscriber {
        let receiver = self.sender.subscribe();
        let count = self.subscriber_count.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(subscribers = count, "Billing event subscriber connected");

        EventSubscriber {
            receiver,
            subscriber_count: self.subscriber_count.clone(),
        }
    }

    /// Current subscriber count
    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of the event bus
#[derive(Debug)]
pub struct EventSubscriber {
    receiver: broadcast::Receiver<BillingEvent>,
    subscriber_count: Arc<AtomicUsize>,
}

impl EventSubscriber {
    /// Waits for the next event; `None` once the bus is gone
    pub async fn recv(&mut self) -> Option<BillingEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Billing event subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for EventSubscriber {
    fn drop(&mut self) {
        let remaining = self.subscriber_count.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        tracing::info!(subscribers = remaining, "Billing event subscriber disconnected");
    }
}
