//! HTTP API for training, applying models, usage stats, health checks and
//! Prometheus metrics

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use slr_lib::{health::ComponentStatus, ErrorKind, Operation, RegressionService, SlrError};
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: RegressionService,
}

impl AppState {
    pub fn new(service: RegressionService) -> Self {
        Self { service }
    }
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error returned by the API handlers
pub struct ApiError(SlrError);

impl From<SlrError> for ApiError {
    fn from(err: SlrError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct TrainParams {
    store: Option<String>,
}

impl TrainParams {
    fn store_requested(&self) -> bool {
        matches!(self.store.as_deref(), Some("1") | Some("true"))
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplyParams {
    model: Option<String>,
    arg: Option<String>,
}

/// Fit a model over a JSON array of `[x, y]` or `[x, y, weight]` rows
async fn train(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TrainParams>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let service = &state.service;

    let rows: Vec<Vec<f64>> = serde_json::from_slice(&body).map_err(|e| {
        service.reject(Operation::Train, SlrError::MalformedInput(e.to_string()))
    })?;

    let results = service.train_rows(&rows, params.store_requested()).await?;
    Ok(Json(results))
}

/// Apply a stored model to `arg`
async fn apply(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApplyParams>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &state.service;

    let arg = match params.arg.as_deref() {
        Some(arg) if !arg.is_empty() => arg,
        _ => {
            return Err(service
                .reject(Operation::Apply, SlrError::MissingParameter("arg"))
                .into())
        }
    };
    let model = match params.model.as_deref() {
        Some(model) if !model.is_empty() => model,
        _ => {
            return Err(service
                .reject(Operation::Apply, SlrError::MissingParameter("model"))
                .into())
        }
    };
    let argument: f64 = arg.trim().parse().map_err(|_| {
        service.reject(Operation::Apply, SlrError::InvalidArgument(arg.to_string()))
    })?;

    let value = service.calculate(model, argument).await?;
    Ok(Json(value))
}

async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.stats().await)
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.service.refresh_health().await;
    let health = state.service.health().health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.service.refresh_health().await;
    let readiness = state.service.health().readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/train", post(train))
        .route("/apply", get(apply))
        .route("/stats", get(stats))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve the API on a bound listener, stopping when `shutdown` resolves
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = ?listener.local_addr()?, "Starting HTTP API server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
