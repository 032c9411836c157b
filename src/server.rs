use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{instrument, warn};

use crate::metrics::{MetricsSource, OsQueryError, SamplingEngine};
use crate::run_state::RunState;

/// Shared handler state: the sampling engine and the start/stop gate.
pub struct AppState<S> {
    engine: Arc<SamplingEngine<S>>,
    run_state: Arc<RunState>,
}

impl<S> AppState<S> {
    pub fn new(engine: SamplingEngine<S>) -> Self {
        AppState {
            engine: Arc::new(engine),
            run_state: Arc::new(RunState::new()),
        }
    }
}

// Manual impl: `#[derive(Clone)]` would require `S: Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState {
            engine: Arc::clone(&self.engine),
            run_state: Arc::clone(&self.run_state),
        }
    }
}

/// Sampling failure surfaced to the client as a 500.
pub struct ApiError(String);

impl From<OsQueryError> for ApiError {
    fn from(err: OsQueryError) -> Self {
        ApiError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0 })),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
struct StatusMessage {
    message: &'static str,
}

/// Build the API router. All responses carry permissive CORS headers; the
/// metrics UI is served from a different origin.
pub fn router<S>(state: AppState<S>) -> Router
where
    S: MetricsSource + Send + Sync + 'static,
{
    Router::new()
        .route("/api/metrics", get(get_metrics::<S>))
        .route("/api/start", post(start_monitoring::<S>))
        .route("/api/stop", post(stop_monitoring::<S>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[instrument(skip_all)]
async fn get_metrics<S>(State(state): State<AppState<S>>) -> Result<Response, ApiError>
where
    S: MetricsSource + Send + Sync + 'static,
{
    if !state.run_state.is_enabled() {
        return Ok(Json(StatusMessage {
            message: "Monitoring is stopped",
        })
        .into_response());
    }

    // The sample blocks for the whole CPU window; keep it off the reactor.
    let engine = Arc::clone(&state.engine);
    let snapshot = tokio::task::spawn_blocking(move || engine.sample())
        .await
        .map_err(|err| {
            warn!(error = %err, "sampling task panicked");
            ApiError("sampling task failed".to_string())
        })?
        .inspect_err(|err| warn!(error = %err, "OS metrics query failed"))?;

    Ok(Json(snapshot).into_response())
}

#[instrument(skip_all)]
async fn start_monitoring<S>(State(state): State<AppState<S>>) -> Json<StatusMessage>
where
    S: MetricsSource + Send + Sync + 'static,
{
    state.run_state.set_enabled(true);
    Json(StatusMessage {
        message: "Monitoring started",
    })
}

#[instrument(skip_all)]
async fn stop_monitoring<S>(State(state): State<AppState<S>>) -> Json<StatusMessage>
where
    S: MetricsSource + Send + Sync + 'static,
{
    state.run_state.set_enabled(false);
    Json(StatusMessage {
        message: "Monitoring stopped",
    })
}
