//! Server-sent billing events

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::time::Duration;

use crate::auth::{permissions, require_role, Claims};
use crate::{error::ApiError, AppState};

const KEEP_ALIVE_SECS: u64 = 15;

/// Streams billing events until the client disconnects
pub async fn billing_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    require_role(&claims, permissions::BILLING_EVENTS)?;

    let subscriber = state.events.subscribe();
    let stream = stream::unfold(subscriber, |mut subscriber| async move {
        loop {
            let event = subscriber.recv().await?;
            match Event::default().event(event.event_type()).json_data(&event) {
                Ok(sse) => return Some((Ok(sse), subscriber)),
                Err(e) => {
                    tracing::warn!(error = %e, event_type = event.event_type(), "Dropping unserializable event");
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(KEEP_ALIVE_SECS))
            .text("keep-alive"),
    ))
}
