use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{relay, sink};

/// Github push payloads can get close to their 25mb cap once commit lists
/// grow; accept up to 50mb.
pub const MAX_EVENT_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct State {
    pub sink: Arc<dyn sink::LogSink + Send + Sync>,
}

async fn index() -> &'static str {
    "relay"
}

pub fn router<S: sink::LogSink + Send + Sync + 'static>(sink: S) -> Router {
    let state = State {
        sink: Arc::new(sink),
    };

    Router::new()
        .route("/", get(index))
        .route("/github/events", post(relay::event))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_EVENT_BYTES))
        .with_state(state)
}
