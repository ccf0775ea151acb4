//! HTTP API: single-model premium prediction, health checks and metrics

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use premium_lib::{
    health::components, ApiRecord, ComponentStatus, HealthRegistry, InferenceError,
    InferenceInvoker, MalformedRequest, ModelRegistry, PremiumMetrics, StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub invoker: InferenceInvoker,
    pub health_registry: HealthRegistry,
    pub metrics: PremiumMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        registry: Arc<ModelRegistry>,
        health_registry: HealthRegistry,
        metrics: PremiumMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            registry,
            invoker: InferenceInvoker::new(),
            health_registry,
            metrics,
            logger,
        }
    }
}

/// Load the registry and assemble state. A model that fails to load aborts startup.
pub async fn build_state(config: &ServerConfig, logger: StructuredLogger) -> Result<Arc<AppState>> {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::REGISTRY).await;
    health_registry.register(components::PREDICTOR).await;

    let registry = ModelRegistry::load(&config.models, &config.model_dir, &config.api_model)
        .context("Failed to load model registry")?;

    let metrics = PremiumMetrics::new();
    for model in registry.iter() {
        metrics.set_model_loaded(model.name(), model.format());
        logger.log_model_loaded(model.name(), model.format());
    }
    metrics.set_models_loaded(registry.len() as i64);

    let state = AppState::new(Arc::new(registry), health_registry.clone(), metrics, logger);
    health_registry.set_ready(true).await;
    Ok(Arc::new(state))
}

/// Successful prediction body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predicted_premium: f64,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Failures of `POST /predict`
#[derive(Debug)]
pub enum ApiError {
    Malformed(MalformedRequest),
    Inference(InferenceError),
}

impl From<MalformedRequest> for ApiError {
    fn from(err: MalformedRequest) -> Self {
        ApiError::Malformed(err)
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        ApiError::Inference(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self {
            ApiError::Malformed(err) => (StatusCode::BAD_REQUEST, "malformed_request", err.to_string()),
            ApiError::Inference(err) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "inference_error", err.to_string())
            }
        };
        (
            status,
            Json(ErrorResponse {
                error,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

/// Predict a premium with the default model; the body is trusted apart from being JSON
async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<PredictResponse>, ApiError> {
    let model = state.registry.default_model();

    let record = ApiRecord::from_slice(&body).map_err(|err| {
        state.metrics.inc_malformed_requests();
        state.logger.log_malformed_request(&err.0);
        err
    })?;

    let start = Instant::now();
    let result = record
        .to_row()
        .and_then(|row| state.invoker.predict_one(model, &row));
    let elapsed = start.elapsed();

    match result {
        Ok(premium) => {
            state
                .metrics
                .observe_prediction_latency(model.name(), elapsed.as_secs_f64());
            state.metrics.inc_predictions_served("api");
            state
                .logger
                .log_prediction(model.name(), premium, elapsed.as_micros() as u64, "api");
            state.health_registry.set_healthy(components::PREDICTOR).await;
            Ok(Json(PredictResponse {
                predicted_premium: premium,
            }))
        }
        Err(err) => {
            state.metrics.inc_prediction_errors("inference");
            state.logger.log_prediction_failed(model.name(), &err.to_string());
            // Only model-side failures degrade the predictor
            if matches!(err, InferenceError::Backend { .. } | InferenceError::NonFinite { .. }) {
                state
                    .health_registry
                    .set_degraded(components::PREDICTOR, err.to_string())
                    .await;
            }
            Err(err.into())
        }
    }
}

/// Health check response - returns 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 once the registry is loaded
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

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

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
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
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Serve until the shutdown future completes
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = create_router(state);

    info!(addr = ?listener.local_addr().ok(), "Starting API server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
