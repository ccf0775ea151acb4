//! Observability for the premium predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency, served predictions, errors, loaded models)
//! - Structured logging of service events with tracing

use prometheus::{
    register_gauge_vec, register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge, GaugeVec, HistogramVec, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for inference latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
];

static GLOBAL_METRICS: OnceLock<MetricsInner> = OnceLock::new();

struct MetricsInner {
    prediction_latency_seconds: HistogramVec,
    predictions_served: IntCounterVec,
    prediction_errors: IntCounterVec,
    malformed_requests: IntCounter,
    models_loaded: IntGauge,
    model_info: GaugeVec,
}

impl MetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram_vec!(
                "premium_prediction_latency_seconds",
                "Time spent in a single model inference call",
                &["model"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_served: register_int_counter_vec!(
                "premium_predictions_served_total",
                "Predictions returned to callers",
                &["path"]
            )
            .expect("Failed to register predictions_served_total"),

            prediction_errors: register_int_counter_vec!(
                "premium_prediction_errors_total",
                "Prediction requests that failed",
                &["kind"]
            )
            .expect("Failed to register prediction_errors_total"),

            malformed_requests: register_int_counter!(
                "premium_malformed_requests_total",
                "Request bodies that were not a JSON object"
            )
            .expect("Failed to register malformed_requests_total"),

            models_loaded: register_int_gauge!(
                "premium_models_loaded",
                "Number of models in the registry"
            )
            .expect("Failed to register models_loaded"),

            model_info: register_gauge_vec!(
                "premium_model_info",
                "Loaded model artifacts",
                &["model", "format"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Handle to the process-wide metrics; clones share the same metrics
#[derive(Clone)]
pub struct PremiumMetrics {
    _private: (),
}

impl Default for PremiumMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PremiumMetrics {
    /// Create a handle, registering the metrics on first use
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(MetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &MetricsInner {
        GLOBAL_METRICS.get_or_init(MetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, model: &str, duration_secs: f64) {
        self.inner()
            .prediction_latency_seconds
            .with_label_values(&[model])
            .observe(duration_secs);
    }

    /// Count a served prediction; `path` is "api" or "interactive"
    pub fn inc_predictions_served(&self, path: &str) {
        self.inner().predictions_served.with_label_values(&[path]).inc();
    }

    pub fn inc_prediction_errors(&self, kind: &str) {
        self.inner().prediction_errors.with_label_values(&[kind]).inc();
    }

    pub fn inc_malformed_requests(&self) {
        self.inner().malformed_requests.inc();
    }

    /// Record a loaded model
    pub fn set_model_loaded(&self, model: &str, format: &str) {
        self.inner()
            .model_info
            .with_label_values(&[model, format])
            .set(1.0);
    }

    pub fn set_models_loaded(&self, count: i64) {
        self.inner().models_loaded.set(count);
    }
}

/// Structured logger for service events
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str, models: &[&str], api_model: &str) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            models = ?models,
            api_model = %api_model,
            "Premium predictor started"
        );
    }

    pub fn log_model_loaded(&self, model: &str, format: &str) {
        info!(
            event = "model_loaded",
            service = %self.service,
            model = %model,
            format = %format,
            "Model ready"
        );
    }

    pub fn log_prediction(&self, model: &str, premium: f64, elapsed_us: u64, path: &str) {
        info!(
            event = "prediction_served",
            service = %self.service,
            model = %model,
            predicted_premium = premium,
            elapsed_us = elapsed_us,
            path = %path,
            "Served premium prediction"
        );
    }

    pub fn log_prediction_failed(&self, model: &str, error: &str) {
        warn!(
            event = "prediction_failed",
            service = %self.service,
            model = %model,
            error = %error,
            "Prediction request failed"
        );
    }

    pub fn log_malformed_request(&self, reason: &str) {
        warn!(
            event = "malformed_request",
            service = %self.service,
            reason = %reason,
            "Rejected request body"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Premium predictor shutting down"
        );
    }
}
