//! Error types for the premium predictor
//!
//! Every failure is terminal for the request it occurs in (or for the
//! process, in the case of [`LoadError`]). Nothing here is retried.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single problem found while checking a record against the feature schema
#[derive(Debug, Clone, PartialEq)]
pub enum FieldViolation {
    /// A schema field has no value
    Missing { field: String },
    /// A key that is not part of the schema
    Unknown { field: String },
    /// A bounded field outside its declared range
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
    /// A value of the wrong kind (e.g. a string for an integer field)
    WrongKind { field: String, expected: &'static str },
}

impl FieldViolation {
    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            FieldViolation::Missing { field }
            | FieldViolation::Unknown { field }
            | FieldViolation::OutOfRange { field, .. }
            | FieldViolation::WrongKind { field, .. } => field,
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldViolation::Missing { field } => write!(f, "{field} is missing"),
            FieldViolation::Unknown { field } => write!(f, "{field} is not a known field"),
            FieldViolation::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field}={value} is outside [{min}, {max}]"),
            FieldViolation::WrongKind { field, expected } => {
                write!(f, "{field} must be {expected}")
            }
        }
    }
}

/// Record failed schema validation (interactive path only)
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid feature record: {}", join_violations(.violations))]
pub struct SchemaError {
    pub violations: Vec<FieldViolation>,
}

impl SchemaError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        Self { violations }
    }

    /// Names of all fields that failed validation, in report order
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(FieldViolation::field).collect()
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A model artifact could not be loaded. Fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no models configured")]
    Empty,

    #[error("failed to read model '{name}' from {path:?}: {source}")]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model '{name}' at {path:?} is not a valid model document: {reason}")]
    Parse {
        name: String,
        path: PathBuf,
        reason: String,
    },

    #[error("failed to load ONNX model '{name}' from {path:?}: {reason}")]
    Onnx {
        name: String,
        path: PathBuf,
        reason: String,
    },

    #[error("model '{name}' at {path:?} has unsupported artifact format")]
    Format { name: String, path: PathBuf },

    #[error("checksum mismatch for model '{name}': expected {expected}, got {actual}")]
    Checksum {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("model name '{0}' is configured more than once")]
    Duplicate(String),

    #[error("default model '{0}' is not among the configured models")]
    MissingDefault(String),
}

/// A prediction call failed. The whole request fails with it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("feature set does not match the model: missing [{}], unexpected [{}]", .missing.join(", "), .unexpected.join(", "))]
    FeatureMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("feature '{field}' has a non-numeric value")]
    InvalidValue { field: String },

    #[error("model '{model}' failed: {reason}")]
    Backend { model: String, reason: String },

    #[error("model '{model}' produced a non-finite prediction")]
    NonFinite { model: String },
}

/// Request body could not be parsed as a JSON object (API path only)
#[derive(Debug, Clone, PartialEq, Error)]
#[error("malformed request: {0}")]
pub struct MalformedRequest(pub String);
