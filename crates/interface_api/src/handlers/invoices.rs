//! Invoice handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use validator::Validate;

use core_kernel::InvoiceId;
use domain_billing::Invoice;

use crate::auth::{permissions, require_role, Claims};
use crate::dto::invoice::*;
use crate::{error::ApiError, AppState};

fn parse_id(id: &str) -> Result<InvoiceId, ApiError> {
    id.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid invoice id: {}", id)))
}

/// Lists invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<Vec<Invoice>>, ApiError> {
    require_role(&claims, permissions::INVOICE_READ)?;
    query.validate()?;

    let invoices = state.invoices.list_invoices(query.into_query()?).await?;
    Ok(Json(invoices))
}

/// Gets an invoice by ID
pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, ApiError> {
    require_role(&claims, permissions::INVOICE_READ)?;

    let invoice = state.invoices.get_invoice(parse_id(&id)?).await?;
    Ok(Json(invoice))
}

/// Cancels an unpaid invoice
pub async fn cancel_invoice(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(request): Json<CancelInvoiceRequest>,
) -> Result<Json<Invoice>, ApiError> {
    require_role(&claims, permissions::INVOICE_WRITE)?;
    request.validate()?;

    let reason = format!("Cancelled by {}: {}", claims.sub, request.reason);
    let invoice = state.reconciler.cancel_invoice(parse_id(&id)?, &reason).await?;
    Ok(Json(invoice))
}
