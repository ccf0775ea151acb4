//! Unchecked records from API request bodies

use crate::error::{InferenceError, MalformedRequest};
use crate::schema::FeatureRow;
use serde_json::{Map, Value};

/// Field values exactly as a caller sent them.
///
/// Only JSON well-formedness is checked; keys are taken as field names
/// without looking at the schema, and missing keys are not an error here.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRecord(Map<String, Value>);

impl ApiRecord {
    /// Parse a request body
    pub fn from_slice(body: &[u8]) -> Result<Self, MalformedRequest> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| MalformedRequest(e.to_string()))?;
        Self::from_value(value)
    }

    /// Accept an already parsed JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, MalformedRequest> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(MalformedRequest(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Model input for this record; fails if the column set does not match
    pub fn to_row(&self) -> Result<FeatureRow, InferenceError> {
        FeatureRow::from_json_object(&self.0)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_partial_object() {
        let record = ApiRecord::from_slice(br#"{"Age": 35, "Height": 170}"#).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.fields().collect::<Vec<_>>(), vec!["Age", "Height"]);
    }

    #[test]
    fn test_empty_object_is_accepted() {
        let record = ApiRecord::from_slice(b"{}").unwrap();
        assert!(record.is_empty());
        assert!(record.to_row().is_err());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(ApiRecord::from_slice(b"{\"Age\": ").is_err());
        assert!(ApiRecord::from_slice(b"not json").is_err());
    }

    #[test]
    fn test_non_object_is_malformed() {
        let err = ApiRecord::from_slice(b"[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }
}
