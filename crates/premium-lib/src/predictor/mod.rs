//! Premium prediction backends
//!
//! A loaded model is an opaque [`Predictor`] behind a named
//! [`ModelHandle`]. Artifacts are either ONNX graphs (run with tract) or
//! native JSON model documents.

mod inference;
mod native;
mod onnx;

pub use inference::{round_premium, InferenceInvoker, PredictionResult, MAX_INFERENCE_MS};
pub use native::{Aggregation, LinearModel, NativeModel, TreeEnsemble};
pub use onnx::OnnxPredictor;

use crate::error::LoadError;
use crate::schema::FeatureRow;
use anyhow::Result;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Trait for prediction implementations
pub trait Predictor: Send + Sync {
    /// Predict a premium for one row of features
    fn predict(&self, row: &FeatureRow) -> Result<f64>;

    /// Artifact format, for logs and metrics
    fn format(&self) -> &'static str;
}

/// A named, immutable, shareable predictor
#[derive(Clone)]
pub struct ModelHandle {
    name: Arc<str>,
    predictor: Arc<dyn Predictor>,
}

impl ModelHandle {
    pub fn new(name: impl Into<Arc<str>>, predictor: Arc<dyn Predictor>) -> Self {
        Self {
            name: name.into(),
            predictor,
        }
    }

    /// Display name, e.g. "Random Forest"
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> &'static str {
        self.predictor.format()
    }

    pub(crate) fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.name)
            .field("format", &self.format())
            .finish()
    }
}

/// Build a predictor from artifact bytes, choosing the backend by file extension
pub fn load_artifact(name: &str, path: &Path, bytes: &[u8]) -> Result<Arc<dyn Predictor>, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("onnx") => OnnxPredictor::from_bytes(bytes)
            .map(|p| Arc::new(p) as Arc<dyn Predictor>)
            .map_err(|e| LoadError::Onnx {
                name: name.to_string(),
                path: path.to_path_buf(),
                reason: format!("{e:#}"),
            }),
        Some("json") => NativeModel::from_slice(bytes)
            .map(|m| Arc::new(m) as Arc<dyn Predictor>)
            .map_err(|e| LoadError::Parse {
                name: name.to_string(),
                path: path.to_path_buf(),
                reason: format!("{e:#}"),
            }),
        _ => Err(LoadError::Format {
            name: name.to_string(),
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension_is_rejected() {
        let Err(err) = load_artifact("RF", Path::new("model.pkl"), b"") else {
            panic!("pickle artifact should be rejected");
        };
        assert!(matches!(err, LoadError::Format { .. }));
    }

    #[test]
    fn test_corrupt_json_is_parse_error() {
        let Err(err) = load_artifact("RF", Path::new("model.json"), b"{not json") else {
            panic!("corrupt JSON should fail to load");
        };
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_corrupt_onnx_is_onnx_error() {
        let Err(err) = load_artifact("LR", Path::new("model.ONNX"), b"garbage") else {
            panic!("corrupt ONNX should fail to load");
        };
        assert!(matches!(err, LoadError::Onnx { .. }));
    }

    #[test]
    fn test_json_artifact_loads() {
        let doc = br#"{"type": "linear", "intercept": 100.0, "coefficients": {"Age": 2.0}}"#;
        let predictor = load_artifact("LR", Path::new("lr.json"), doc).unwrap();
        assert_eq!(predictor.format(), "json-linear");
    }
}
