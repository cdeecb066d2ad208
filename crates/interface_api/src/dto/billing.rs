//! Billing DTOs

use axum::{body::Bytes, Json};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use domain_billing::{BillingRunResult, ReconciliationSummary};

use crate::error::ApiError;

/// Parses a body that may be omitted
///
/// An empty body yields `T::default()`. Anything else must be valid JSON for
/// `T`, otherwise the request is rejected.
pub fn optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Json::<T>::from_bytes(body)
        .map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Body of `POST /billing/run`; an absent date means today
#[derive(Debug, Default, Deserialize)]
pub struct RunBillingRequest {
    pub date: Option<NaiveDate>,
}

/// Body of `POST /billing/reconcile`; an absent date means today
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileRequest {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct BillingRunResponse {
    pub message: String,
    pub partial_success: bool,
    #[serde(flatten)]
    pub result: BillingRunResult,
}

impl From<BillingRunResult> for BillingRunResponse {
    fn from(result: BillingRunResult) -> Self {
        Self {
            message: result.summary(),
            partial_success: result.is_partial_success(),
            result,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub summary: ReconciliationSummary,
}
