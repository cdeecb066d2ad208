//! Billing run handlers

use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};

use crate::auth::{permissions, require_role, Claims};
use crate::dto::billing::*;
use crate::{error::ApiError, AppState};

/// Runs daily billing for the given date (default today)
///
/// The body is optional; a body that is present must parse. Answers
/// `207 Multi-Status` when any contract failed.
pub async fn run_billing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Result<(StatusCode, Json<BillingRunResponse>), ApiError> {
    require_role(&claims, permissions::BILLING_RUN)?;

    let request: RunBillingRequest = optional_body(&body)?;
    let date = request.date.unwrap_or_else(super::today);

    tracing::info!(user = %claims.sub, %date, "Billing run requested");
    let result = state.runner.run_daily_billing(date).await?;

    let status = if result.has_failures() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };
    Ok((status, Json(result.into())))
}

/// Polls open captures and marks overdue invoices
pub async fn reconcile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Result<Json<ReconcileResponse>, ApiError> {
    require_role(&claims, permissions::BILLING_RUN)?;

    let request: ReconcileRequest = optional_body(&body)?;
    let date = request.date.unwrap_or_else(super::today);

    let summary = state.reconciler.reconcile(date).await?;
    Ok(Json(ReconcileResponse { date, summary }))
}
