//! Lease calendar handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Serialize;
use validator::Validate;

use core_kernel::DateSpan;
use domain_lease::{project_events, CalendarEvent};

use crate::auth::{permissions, require_role, Claims};
use crate::dto::calendar::CalendarQuery;
use crate::{error::ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub window: DateSpan,
    pub count: usize,
    pub events: Vec<CalendarEvent>,
}

/// Projects lease events for the requested window
pub async fn get_calendar(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, ApiError> {
    require_role(&claims, permissions::CALENDAR_READ)?;
    query.validate()?;

    let today = query.as_of.unwrap_or_else(super::today);
    let filters = query.filters()?;
    let window = query.window(today, state.config.calendar_window_days)?;

    let contracts = state.contracts.list_contracts().await?;
    let events = project_events(&contracts, &filters, window, today);

    tracing::debug!(
        contracts = contracts.len(),
        events = events.len(),
        window_start = %window.start,
        window_end = %window.end,
        "Calendar projected"
    );

    Ok(Json(CalendarResponse {
        window,
        count: events.len(),
        events,
    }))
}
