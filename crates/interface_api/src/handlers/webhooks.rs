//! Payment provider webhooks

use axum::{extract::State, Json};

use domain_billing::{PaymentWebhook, WebhookOutcome};

use crate::{error::ApiError, AppState};

/// Receives capture notifications from the payment provider
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(webhook): Json<PaymentWebhook>,
) -> Result<Json<WebhookOutcome>, ApiError> {
    tracing::info!(
        event_type = ?webhook.event_type,
        payment_id = %webhook.payment_id,
        "Payment webhook received"
    );
    let outcome = state.reconciler.handle_webhook(webhook).await?;
    Ok(Json(outcome))
}
