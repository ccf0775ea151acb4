//! Form state for the interactive path
//!
//! Holds one control per schema field, starting from the form defaults.
//! Entries are parsed and range-checked as they are made, like a bounded
//! spinner, but nothing leaves the form until [`FormSession::submit`].

use crate::error::{FieldViolation, SchemaError};
use crate::schema::{field, FeatureRecord, FieldKind, FieldSpec, FieldValue};

/// Editable form over all schema fields
#[derive(Debug, Clone, Default)]
pub struct FormSession {
    record: FeatureRecord,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a control
    pub fn value(&self, name: &str) -> Option<FieldValue> {
        self.record.get(name)
    }

    /// Parse operator input for a control and store it.
    ///
    /// Blank input keeps the current value. Input that does not parse, or
    /// falls outside the control's bounds, leaves the form unchanged.
    pub fn enter(&mut self, name: &str, input: &str) -> Result<FieldValue, FieldViolation> {
        let spec = field(name).ok_or_else(|| FieldViolation::Unknown {
            field: name.to_string(),
        })?;

        let input = input.trim();
        if input.is_empty() {
            return self.record.get(name).ok_or_else(|| FieldViolation::Missing {
                field: name.to_string(),
            });
        }

        let value = parse_input(spec, input)?;
        spec.check_bounds(value)?;
        self.record.set(name, value)?;
        Ok(value)
    }

    /// The explicit submit action: validate and hand over the record
    pub fn submit(&self) -> Result<FeatureRecord, SchemaError> {
        self.record.clone().validate()
    }
}

fn parse_input(spec: &FieldSpec, input: &str) -> Result<FieldValue, FieldViolation> {
    let wrong_kind = || FieldViolation::WrongKind {
        field: spec.name.to_string(),
        expected: spec.kind.describe(),
    };

    match spec.kind {
        FieldKind::Integer { .. } => input
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|_| wrong_kind()),
        FieldKind::Float { .. } | FieldKind::Numeric => input
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(FieldValue::Float)
            .ok_or_else(wrong_kind),
        FieldKind::Flag => match input.to_lowercase().as_str() {
            "y" | "yes" | "1" => Ok(FieldValue::Int(1)),
            "n" | "no" | "0" => Ok(FieldValue::Int(0)),
            _ => Err(wrong_kind()),
        },
        FieldKind::Boolean => match input.to_lowercase().as_str() {
            "y" | "yes" | "true" | "x" => Ok(FieldValue::Bool(true)),
            "n" | "no" | "false" => Ok(FieldValue::Bool(false)),
            _ => Err(wrong_kind()),
        },
    }
}
