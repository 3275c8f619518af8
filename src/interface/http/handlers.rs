use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

use crate::adapters::SampleStore;
use crate::domain::Sample;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SampleStore>,
}

/// Wire form of a sample
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResponse {
    pub interface_name: String,
    pub signal_quality: f64,
    pub connected: bool,
    pub timestamp: String,
}

impl From<&Sample> for SampleResponse {
    fn from(sample: &Sample) -> Self {
        Self {
            interface_name: sample.interface_name.clone(),
            signal_quality: sample.signal_quality,
            connected: sample.connected,
            timestamp: sample.timestamp.to_rfc3339(),
        }
    }
}

/// Response for /api/history/{iface}
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub interface: String,
    pub samples: Vec<SampleResponse>,
}

/// Handler for GET /api/health
pub async fn health_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "service": "wifi-radar"
        })),
    )
}

/// Handler for GET /api/status
///
/// Interfaces without a sample yet map to `null`.
pub async fn status_handler(State(state): State<AppState>) -> Json<BTreeMap<String, Option<SampleResponse>>> {
    let snapshot = state.store.status();
    let body = snapshot
        .iter()
        .map(|(name, status)| {
            (
                name.to_string(),
                status.sample().map(|s| SampleResponse::from(&**s)),
            )
        })
        .collect();

    Json(body)
}

/// Handler for GET /api/best
pub async fn best_handler(State(state): State<AppState>) -> Response {
    match state.store.best() {
        Some(sample) => (StatusCode::OK, Json(SampleResponse::from(&*sample))).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Handler for GET /api/history/{iface}
pub async fn history_handler(
    State(state): State<AppState>,
    Path(interface): Path<String>,
) -> Response {
    match state.store.history(&interface) {
        Some(samples) => {
            let samples = samples.iter().map(|s| SampleResponse::from(&**s)).collect();
            (StatusCode::OK, Json(HistoryResponse { interface, samples })).into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("unknown interface: {}", interface)).into_response(),
    }
}

/// Handler for GET /api/stream
///
/// One SSE `data:` event per accepted sample, starting from attach time.
/// The subscription is released when the client goes away and axum drops
/// the stream.
pub async fn stream_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.store.subscribe();
    debug!(subscriber = subscription.id(), "stream client attached");

    let events = subscription.into_stream().filter_map(|sample| async move {
        match Event::default().json_data(SampleResponse::from(&*sample)) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!(error = %e, "failed to encode sample event");
                None
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
