use axum::extract::State;
use axum::http::HeaderMap;
use bytes::Bytes;
use serde_json::Value;
use tracing::instrument;

use crate::api::RelayError;
use crate::event::{build_log_record, DELIVERY_ID_HEADER, EVENT_TYPE_HEADER, PUSH_EVENT};
use crate::router;

#[instrument(skip_all, fields(event_type, delivery))]
pub async fn event(
    state: State<router::State>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<String, RelayError> {
    let event_type = headers
        .get(EVENT_TYPE_HEADER)
        .map_or("", |v| v.to_str().unwrap_or(""));
    let delivery = headers
        .get(DELIVERY_ID_HEADER)
        .map_or("", |v| v.to_str().unwrap_or(""));

    tracing::Span::current().record("event_type", event_type);
    tracing::Span::current().record("delivery", delivery);

    tracing::debug!("received webhook request");

    // Only push events carry the broken repository timestamps; everything
    // else completes without an outbound call.
    if event_type != PUSH_EVENT {
        tracing::debug!("ignoring non-push event");
        return Ok(String::new());
    }

    tracing::debug!("event is a push event");

    let payload: Value = serde_json::from_slice(&body)?;
    let record = build_log_record(&headers, payload);

    tracing::debug!("sending record to logstash");
    state.sink.send(record).await?;
    tracing::debug!("request to logstash complete");

    Ok(String::from("OK!"))
}
