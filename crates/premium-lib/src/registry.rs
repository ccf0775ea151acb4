//! Model registry
//!
//! Loads every configured model artifact exactly once at startup and hands
//! out shared, read-only handles for the rest of the process lifetime. Any
//! artifact failing to load fails the whole registry: serving premiums from
//! a partially populated registry would silently drop a model.

use crate::error::LoadError;
use crate::predictor::{load_artifact, ModelHandle};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Model served by the API path unless configured otherwise
pub const DEFAULT_API_MODEL: &str = "XGBoost";

/// Where to find one model artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Display name, e.g. "Random Forest"
    pub name: String,
    /// Artifact path; relative paths are resolved against the model directory
    pub path: PathBuf,
    /// Optional hex SHA-256 of the artifact bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            sha256: None,
        }
    }

    pub fn with_sha256(mut self, checksum: impl Into<String>) -> Self {
        self.sha256 = Some(checksum.into());
        self
    }

    /// Resolve the artifact path against a base directory
    pub fn resolve(&self, model_dir: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            model_dir.join(&self.path)
        }
    }
}

/// The four models the premium calculator compares
pub fn default_model_specs() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new("Random Forest", "random_forest_insurance_model.json"),
        ModelSpec::new("Decision Tree", "decision_tree_model.json"),
        ModelSpec::new("XGBoost", "xgboost_model.json"),
        ModelSpec::new("Linear Regression", "linear_regression_model.onnx"),
    ]
}

/// Hex SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Fixed set of named models, immutable after construction
#[derive(Debug)]
pub struct ModelRegistry {
    models: Vec<ModelHandle>,
    default: usize,
}

impl ModelRegistry {
    /// Load all artifacts; the first failure aborts
    pub fn load(specs: &[ModelSpec], model_dir: &Path, default_model: &str) -> Result<Self, LoadError> {
        let handles = specs
            .iter()
            .map(|spec| load_model(spec, model_dir))
            .collect::<Result<Vec<_>, _>>()?;

        let registry = Self::from_handles(handles, default_model)?;
        info!(
            models = registry.len(),
            default_model = %default_model,
            "Model registry loaded"
        );
        Ok(registry)
    }

    /// Assemble a registry from already loaded handles
    pub fn from_handles(models: Vec<ModelHandle>, default_model: &str) -> Result<Self, LoadError> {
        if models.is_empty() {
            return Err(LoadError::Empty);
        }

        let mut seen = HashSet::new();
        for model in &models {
            if !seen.insert(model.name()) {
                return Err(LoadError::Duplicate(model.name().to_string()));
            }
        }

        let default = models
            .iter()
            .position(|m| m.name() == default_model)
            .ok_or_else(|| LoadError::MissingDefault(default_model.to_string()))?;

        Ok(Self { models, default })
    }

    pub fn get(&self, name: &str) -> Option<&ModelHandle> {
        self.models.iter().find(|m| m.name() == name)
    }

    /// Handle used by the API path
    pub fn default_model(&self) -> &ModelHandle {
        &self.models[self.default]
    }

    /// All models in configured order
    pub fn iter(&self) -> impl Iterator<Item = &ModelHandle> {
        self.models.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(ModelHandle::name).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn load_model(spec: &ModelSpec, model_dir: &Path) -> Result<ModelHandle, LoadError> {
    let path = spec.resolve(model_dir);
    let bytes = std::fs::read(&path).map_err(|source| LoadError::Io {
        name: spec.name.clone(),
        path: path.clone(),
        source,
    })?;

    if let Some(expected) = &spec.sha256 {
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(LoadError::Checksum {
                name: spec.name.clone(),
                expected: expected.clone(),
                actual,
            });
        }
        debug!(model = %spec.name, "Checksum verified");
    }

    let predictor = load_artifact(&spec.name, &path, &bytes)?;
    info!(
        model = %spec.name,
        format = predictor.format(),
        path = %path.display(),
        size_bytes = bytes.len(),
        "Loaded model artifact"
    );
    Ok(ModelHandle::new(spec.name.as_str(), predictor))
}
