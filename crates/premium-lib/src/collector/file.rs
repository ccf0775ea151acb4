//! Feature records read from JSON files

use super::{CollectError, InputCollector};
use crate::schema::FeatureRecord;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// Reads one record from a JSON file and checks it against the schema,
/// the same way a submitted form is checked.
pub struct JsonFileCollector {
    path: PathBuf,
}

impl JsonFileCollector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl InputCollector for JsonFileCollector {
    fn collect(&mut self) -> Result<Option<FeatureRecord>, CollectError> {
        let content = std::fs::read_to_string(&self.path)?;
        debug!(path = ?self.path, bytes = content.len(), "Read feature record file");

        let value: Value =
            serde_json::from_str(&content).map_err(|e| CollectError::Parse(e.to_string()))?;
        let Value::Object(object) = value else {
            return Err(CollectError::Parse(format!(
                "{:?} does not contain a JSON object",
                self.path
            )));
        };

        Ok(Some(FeatureRecord::from_json_object(&object)?))
    }
}
