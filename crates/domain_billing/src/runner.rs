//! Daily billing run
//!
//! Bills every contract in overage concurrently, one tokio task per contract.
//! A failing contract never cancels its siblings; each outcome is collected
//! and the run reports partial success when both kinds exist.
//!
//! The run is idempotent per call, not per day. Whether a second same-day run
//! bills again depends on the generator's [`BillingPolicy`](crate::BillingPolicy).

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use core_kernel::{BillingRunId, ContractId, InvoiceId};
use domain_lease::{ContractPort, LeaseError, LeaseStatus};

use crate::error::BillingError;
use crate::generator::{InvoiceGenerator, PaymentOutcome};
use crate::invoice::Invoice;
use crate::notifier::{BillingEvent, EventBus};

/// Where in the per-contract pipeline a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// The invoice could not be created
    InvoiceCreation,
    /// The invoice exists but capture could not be initiated
    PaymentCapture,
    /// The task itself panicked or was aborted
    Task,
}

/// One contract that could not be fully billed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingFailure {
    pub contract_id: ContractId,
    pub stage: FailureStage,
    /// Set when the invoice was created before the failure
    pub invoice_id: Option<InvoiceId>,
    pub message: String,
}

/// Aggregated outcome of one billing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRunResult {
    pub run_id: BillingRunId,
    pub run_date: NaiveDate,
    /// Contracts found in overage and handed to the generator
    pub processed_count: usize,
    /// Invoices fully billed (created and, for auto-billing, capture initiated)
    pub generated_invoices: Vec<Invoice>,
    pub failures: Vec<BillingFailure>,
    /// Contracts where the generator found nothing to bill
    pub skipped_count: usize,
}

impl BillingRunResult {
    fn new(run_date: NaiveDate) -> Self {
        Self {
            run_id: BillingRunId::new_v7(),
            run_date,
            processed_count: 0,
            generated_invoices: Vec::new(),
            failures: Vec::new(),
            skipped_count: 0,
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Some contracts billed and some failed
    pub fn is_partial_success(&self) -> bool {
        !self.generated_invoices.is_empty() && !self.failures.is_empty()
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        format!(
            "Daily billing for {}: {} invoice(s) generated, {} failure(s), {} skipped",
            self.run_date,
            self.generated_invoices.len(),
            self.failures.len(),
            self.skipped_count
        )
    }
}

/// Orchestrates the daily billing job
#[derive(Clone)]
pub struct DailyBillingRunner {
    contracts: Arc<dyn ContractPort>,
    generator: InvoiceGenerator,
    notifier: EventBus,
}

impl DailyBillingRunner {
    pub fn new(contracts: Arc<dyn ContractPort>, generator: InvoiceGenerator, notifier: EventBus) -> Self {
        Self {
            contracts,
            generator,
            notifier,
        }
    }

    /// Bills every contract in overage as of `today`
    ///
    /// # Errors
    ///
    /// Only a failure to load contracts fails the run as a whole. Everything
    /// after that is recorded per contract in the result.
    pub async fn run_daily_billing(&self, today: NaiveDate) -> Result<BillingRunResult, BillingError> {
        let contracts = self
            .contracts
            .list_contracts()
            .await
            .map_err(LeaseError::from)?;

        let overdue: Vec<_> = contracts
            .into_iter()
            .filter(|c| c.status(today) == LeaseStatus::Overage)
            .collect();

        let mut result = BillingRunResult::new(today);
        result.processed_count = overdue.len();

        tracing::info!(
            run_id = %result.run_id,
            run_date = %today,
            contracts = overdue.len(),
            policy = %self.generator.policy(),
            "Daily billing run started"
        );

        let handles: Vec<_> = overdue
            .into_iter()
            .map(|contract| {
                let generator = self.generator.clone();
                let contract_id = contract.id;
                let handle =
                    tokio::spawn(async move { generator.generate_invoice(&contract, today).await });
                (contract_id, handle)
            })
            .collect();

        for (contract_id, handle) in handles {
            match handle.await {
                Ok(Ok(Some(outcome))) => match outcome.payment {
                    PaymentOutcome::Failed { message } => result.failures.push(BillingFailure {
                        contract_id,
                        stage: FailureStage::PaymentCapture,
                        invoice_id: Some(outcome.invoice.id),
                        message,
                    }),
                    PaymentOutcome::NotRequested | PaymentOutcome::Initiated { .. } => {
                        result.generated_invoices.push(outcome.invoice)
                    }
                },
                Ok(Ok(None)) => result.skipped_count += 1,
                Ok(Err(e)) => {
                    tracing::error!(contract_id = %contract_id, error = %e, "Invoice generation failed");
                    result.failures.push(BillingFailure {
                        contract_id,
                        stage: FailureStage::InvoiceCreation,
                        invoice_id: None,
                        message: e.to_string(),
                    });
                }
                Err(join_error) => {
                    tracing::error!(contract_id = %contract_id, error = %join_error, "Billing task failed");
                    result.failures.push(BillingFailure {
                        contract_id,
                        stage: FailureStage::Task,
                        invoice_id: None,
                        message: join_error.to_string(),
                    });
                }
            }
        }

        let message = result.summary();
        if result.has_failures() {
            tracing::warn!(run_id = %result.run_id, "{}", message);
        } else {
            tracing::info!(run_id = %result.run_id, "{}", message);
        }

        self.notifier.broadcast(BillingEvent::BillingRunCompleted {
            run_date: today,
            message,
            processed_count: result.processed_count,
            generated_count: result.generated_invoices.len(),
            failure_count: result.failures.len(),
            completed_at: Utc::now(),
        });

        Ok(result)
    }
}
