//! Invoice DTOs

use serde::Deserialize;
use validator::Validate;

use core_kernel::ContractId;
use domain_billing::{InvoiceQuery, InvoiceStatus};

use crate::error::ApiError;

/// Default page size for invoice listings
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Query string for `GET /invoices`
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ListInvoicesQuery {
    pub contract_id: Option<String>,
    pub status: Option<String>,
    pub payment_id: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListInvoicesQuery {
    pub fn into_query(self) -> Result<InvoiceQuery, ApiError> {
        let contract_id = self
            .contract_id
            .as_deref()
            .map(str::parse::<ContractId>)
            .transpose()
            .map_err(|e| ApiError::BadRequest(format!("invalid contract_id: {}", e)))?;
        let status = self
            .status
            .as_deref()
            .map(str::parse::<InvoiceStatus>)
            .transpose()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        Ok(InvoiceQuery {
            contract_id,
            status,
            payment_id: self.payment_id,
            limit: Some(self.limit.unwrap_or(DEFAULT_PAGE_SIZE)),
            offset: self.offset,
        })
    }
}

/// Body of `POST /invoices/:id/cancel`
#[derive(Debug, Deserialize, Validate)]
pub struct CancelInvoiceRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}
