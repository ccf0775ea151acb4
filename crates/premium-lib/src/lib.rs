//! Core library for insurance premium prediction
//!
//! This crate provides:
//! - The feature schema and the strongly typed feature record
//! - Input collection (interactive form, JSON file, API request body)
//! - The model registry and prediction backends (ONNX via tract, native JSON models)
//! - Inference invocation across one or all registered models
//! - Health checks and observability

pub mod collector;
pub mod error;
pub mod health;
pub mod observability;
pub mod predictor;
pub mod registry;
pub mod schema;

pub use collector::{ApiRecord, CollectError, FormSession, InputCollector, JsonFileCollector, TerminalForm};
pub use error::{FieldViolation, InferenceError, LoadError, MalformedRequest, SchemaError};
pub use health::{ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse};
pub use observability::{PremiumMetrics, StructuredLogger};
pub use predictor::{round_premium, InferenceInvoker, ModelHandle, PredictionResult, Predictor};
pub use registry::{default_model_specs, ModelRegistry, ModelSpec, DEFAULT_API_MODEL};
pub use schema::{FeatureRecord, FeatureRow, FieldKind, FieldSpec, FieldValue, FEATURE_COUNT, FEATURE_SCHEMA};
