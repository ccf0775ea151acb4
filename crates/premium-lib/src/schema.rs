//! Feature schema for premium prediction
//!
//! Defines the canonical, ordered set of 24 applicant attributes every model
//! is trained on, the strongly typed [`FeatureRecord`] that carries them, and
//! the [`FeatureRow`] handed to a model. Models are sensitive to both column
//! identity and column order, so everything that feeds a model goes through
//! [`FEATURE_SCHEMA`].

use crate::error::{FieldViolation, InferenceError, SchemaError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Number of features every model expects
pub const FEATURE_COUNT: usize = 24;

/// Value domain of a schema field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Whole number within inclusive bounds
    Integer { min: i64, max: i64 },
    /// Real number within inclusive bounds
    Float { min: f64, max: f64 },
    /// Unconstrained number (integer or real)
    Numeric,
    /// Yes/No answer stored as 1/0
    Flag,
    /// Indicator checkbox
    Boolean,
}

impl FieldKind {
    /// Inclusive numeric bounds, if the field has any
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match *self {
            FieldKind::Integer { min, max } => Some((min as f64, max as f64)),
            FieldKind::Float { min, max } => Some((min, max)),
            FieldKind::Flag => Some((0.0, 1.0)),
            FieldKind::Numeric | FieldKind::Boolean => None,
        }
    }

    /// Short description used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Integer { .. } => "an integer",
            FieldKind::Float { .. } | FieldKind::Numeric => "a number",
            FieldKind::Flag => "0 or 1",
            FieldKind::Boolean => "true or false",
        }
    }
}

/// Form section a field is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Personal,
    Health,
    RiskScores,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::Personal => "Personal Details",
            Section::Health => "Health Conditions",
            Section::RiskScores => "Risk Scores & Interactions",
        }
    }
}

/// A single scalar feature value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl FieldValue {
    /// Numeric value as seen by a model; booleans become 1.0/0.0
    pub fn as_f64(&self) -> f64 {
        match *self {
            FieldValue::Int(v) => v as f64,
            FieldValue::Float(v) => v,
            FieldValue::Bool(v) => {
                if v {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Convert a JSON scalar; anything else yields `None`
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Int)
                .or_else(|| n.as_f64().map(FieldValue::Float)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Declaration of one schema field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Column name the models were trained with
    pub name: &'static str,
    /// Human readable label for the form
    pub label: &'static str,
    pub section: Section,
    pub kind: FieldKind,
    /// Value the interactive form starts with
    pub default: FieldValue,
}

impl FieldSpec {
    /// Check that `value` has the right kind for this field.
    ///
    /// Integers are accepted for real-valued fields and returned as floats;
    /// no other conversion happens.
    pub fn check_kind(&self, value: FieldValue) -> Result<FieldValue, FieldViolation> {
        let accepted = match (self.kind, value) {
            (FieldKind::Integer { .. } | FieldKind::Flag, FieldValue::Int(_)) => Some(value),
            (FieldKind::Float { .. } | FieldKind::Numeric, FieldValue::Int(v)) => {
                Some(FieldValue::Float(v as f64))
            }
            (FieldKind::Float { .. } | FieldKind::Numeric, FieldValue::Float(v)) if v.is_finite() => {
                Some(value)
            }
            (FieldKind::Boolean, FieldValue::Bool(_)) => Some(value),
            _ => None,
        };

        accepted.ok_or_else(|| FieldViolation::WrongKind {
            field: self.name.to_string(),
            expected: self.kind.describe(),
        })
    }

    /// Check that `value` lies within the field's declared bounds
    pub fn check_bounds(&self, value: FieldValue) -> Result<(), FieldViolation> {
        match self.kind.bounds() {
            Some((min, max)) => {
                let v = value.as_f64();
                if v >= min && v <= max {
                    Ok(())
                } else {
                    Err(FieldViolation::OutOfRange {
                        field: self.name.to_string(),
                        value: v,
                        min,
                        max,
                    })
                }
            }
            None => Ok(()),
        }
    }
}

const fn int(min: i64, max: i64) -> FieldKind {
    FieldKind::Integer { min, max }
}

const fn float(min: f64, max: f64) -> FieldKind {
    FieldKind::Float { min, max }
}

/// The canonical feature list, in model column order
pub static FEATURE_SCHEMA: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec { name: "Age", label: "Age", section: Section::Personal, kind: int(18, 100), default: FieldValue::Int(35) },
    FieldSpec { name: "Diabetes", label: "Diabetes", section: Section::Health, kind: FieldKind::Flag, default: FieldValue::Int(0) },
    FieldSpec { name: "BloodPressureProblems", label: "Blood Pressure Problems", section: Section::Health, kind: FieldKind::Flag, default: FieldValue::Int(1) },
    FieldSpec { name: "AnyTransplants", label: "Any Transplants", section: Section::Health, kind: FieldKind::Flag, default: FieldValue::Int(0) },
    FieldSpec { name: "AnyChronicDiseases", label: "Any Chronic Diseases", section: Section::Health, kind: FieldKind::Flag, default: FieldValue::Int(1) },
    FieldSpec { name: "Height", label: "Height (cm)", section: Section::Personal, kind: int(50, 250), default: FieldValue::Int(170) },
    FieldSpec { name: "Weight", label: "Weight (kg)", section: Section::Personal, kind: int(20, 200), default: FieldValue::Int(75) },
    FieldSpec { name: "KnownAllergies", label: "Known Allergies", section: Section::Health, kind: FieldKind::Flag, default: FieldValue::Int(0) },
    FieldSpec { name: "HistoryOfCancerInFamily", label: "History of Cancer in Family", section: Section::Health, kind: FieldKind::Flag, default: FieldValue::Int(0) },
    FieldSpec { name: "NumberOfMajorSurgeries", label: "Number of Major Surgeries", section: Section::Health, kind: int(0, 20), default: FieldValue::Int(1) },
    FieldSpec { name: "Height_m", label: "Height in meters", section: Section::RiskScores, kind: float(0.5, 2.5), default: FieldValue::Float(1.7) },
    FieldSpec { name: "BMI", label: "BMI", section: Section::RiskScores, kind: float(10.0, 50.0), default: FieldValue::Float(25.95) },
    FieldSpec { name: "ChronicConditionCount", label: "Chronic Condition Count", section: Section::RiskScores, kind: int(0, 10), default: FieldValue::Int(2) },
    FieldSpec { name: "AgeGroup_31-45", label: "Age Group 31-45", section: Section::RiskScores, kind: FieldKind::Boolean, default: FieldValue::Bool(true) },
    FieldSpec { name: "AgeGroup_46-66", label: "Age Group 46-66", section: Section::RiskScores, kind: FieldKind::Boolean, default: FieldValue::Bool(false) },
    FieldSpec { name: "Weight_Height_Ratio", label: "Weight/Height Ratio", section: Section::RiskScores, kind: FieldKind::Numeric, default: FieldValue::Float(0.441) },
    FieldSpec { name: "Age_ChronicInteraction", label: "Age x Chronic Interaction", section: Section::RiskScores, kind: FieldKind::Numeric, default: FieldValue::Float(70.0) },
    FieldSpec { name: "Surgery_ChronicInteraction", label: "Surgery x Chronic Interaction", section: Section::RiskScores, kind: FieldKind::Numeric, default: FieldValue::Float(2.0) },
    FieldSpec { name: "HealthRiskScore", label: "Health Risk Score", section: Section::RiskScores, kind: int(0, 10), default: FieldValue::Int(3) },
    FieldSpec { name: "AgeQuantile", label: "Age Quantile", section: Section::RiskScores, kind: int(0, 5), default: FieldValue::Int(1) },
    FieldSpec { name: "FamilyHealthRisk", label: "Family Health Risk", section: Section::RiskScores, kind: int(0, 5), default: FieldValue::Int(1) },
    FieldSpec { name: "Obese", label: "Obese", section: Section::Personal, kind: FieldKind::Flag, default: FieldValue::Int(0) },
    FieldSpec { name: "SurgeryBurden_Low", label: "Surgery Burden Low", section: Section::RiskScores, kind: FieldKind::Boolean, default: FieldValue::Bool(false) },
    FieldSpec { name: "SurgeryBurden_High", label: "Surgery Burden High", section: Section::RiskScores, kind: FieldKind::Boolean, default: FieldValue::Bool(true) },
];

/// Look up a field declaration by column name
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FEATURE_SCHEMA.iter().find(|spec| spec.name == name)
}

/// Column position of a field in the canonical order
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_SCHEMA.iter().position(|spec| spec.name == name)
}

/// One applicant's complete attribute set
///
/// Field order matches [`FEATURE_SCHEMA`], so the serialized form lists
/// columns in model order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Diabetes")]
    pub diabetes: i64,
    #[serde(rename = "BloodPressureProblems")]
    pub blood_pressure_problems: i64,
    #[serde(rename = "AnyTransplants")]
    pub any_transplants: i64,
    #[serde(rename = "AnyChronicDiseases")]
    pub any_chronic_diseases: i64,
    #[serde(rename = "Height")]
    pub height: i64,
    #[serde(rename = "Weight")]
    pub weight: i64,
    #[serde(rename = "KnownAllergies")]
    pub known_allergies: i64,
    #[serde(rename = "HistoryOfCancerInFamily")]
    pub history_of_cancer_in_family: i64,
    #[serde(rename = "NumberOfMajorSurgeries")]
    pub number_of_major_surgeries: i64,
    #[serde(rename = "Height_m")]
    pub height_m: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "ChronicConditionCount")]
    pub chronic_condition_count: i64,
    #[serde(rename = "AgeGroup_31-45")]
    pub age_group_31_45: bool,
    #[serde(rename = "AgeGroup_46-66")]
    pub age_group_46_66: bool,
    #[serde(rename = "Weight_Height_Ratio")]
    pub weight_height_ratio: f64,
    #[serde(rename = "Age_ChronicInteraction")]
    pub age_chronic_interaction: f64,
    #[serde(rename = "Surgery_ChronicInteraction")]
    pub surgery_chronic_interaction: f64,
    #[serde(rename = "HealthRiskScore")]
    pub health_risk_score: i64,
    #[serde(rename = "AgeQuantile")]
    pub age_quantile: i64,
    #[serde(rename = "FamilyHealthRisk")]
    pub family_health_risk: i64,
    #[serde(rename = "Obese")]
    pub obese: i64,
    #[serde(rename = "SurgeryBurden_Low")]
    pub surgery_burden_low: bool,
    #[serde(rename = "SurgeryBurden_High")]
    pub surgery_burden_high: bool,
}

impl Default for FeatureRecord {
    /// The interactive form's starting values
    fn default() -> Self {
        Self {
            age: 35,
            diabetes: 0,
            blood_pressure_problems: 1,
            any_transplants: 0,
            any_chronic_diseases: 1,
            height: 170,
            weight: 75,
            known_allergies: 0,
            history_of_cancer_in_family: 0,
            number_of_major_surgeries: 1,
            height_m: 1.7,
            bmi: 25.95,
            chronic_condition_count: 2,
            age_group_31_45: true,
            age_group_46_66: false,
            weight_height_ratio: 0.441,
            age_chronic_interaction: 70.0,
            surgery_chronic_interaction: 2.0,
            health_risk_score: 3,
            age_quantile: 1,
            family_health_risk: 1,
            obese: 0,
            surgery_burden_low: false,
            surgery_burden_high: true,
        }
    }
}

impl FeatureRecord {
    /// All values paired with their column names, in canonical order
    pub fn values(&self) -> [(&'static str, FieldValue); FEATURE_COUNT] {
        use FieldValue::{Bool, Float, Int};
        [
            ("Age", Int(self.age)),
            ("Diabetes", Int(self.diabetes)),
            ("BloodPressureProblems", Int(self.blood_pressure_problems)),
            ("AnyTransplants", Int(self.any_transplants)),
            ("AnyChronicDiseases", Int(self.any_chronic_diseases)),
            ("Height", Int(self.height)),
            ("Weight", Int(self.weight)),
            ("KnownAllergies", Int(self.known_allergies)),
            ("HistoryOfCancerInFamily", Int(self.history_of_cancer_in_family)),
            ("NumberOfMajorSurgeries", Int(self.number_of_major_surgeries)),
            ("Height_m", Float(self.height_m)),
            ("BMI", Float(self.bmi)),
            ("ChronicConditionCount", Int(self.chronic_condition_count)),
            ("AgeGroup_31-45", Bool(self.age_group_31_45)),
            ("AgeGroup_46-66", Bool(self.age_group_46_66)),
            ("Weight_Height_Ratio", Float(self.weight_height_ratio)),
            ("Age_ChronicInteraction", Float(self.age_chronic_interaction)),
            ("Surgery_ChronicInteraction", Float(self.surgery_chronic_interaction)),
            ("HealthRiskScore", Int(self.health_risk_score)),
            ("AgeQuantile", Int(self.age_quantile)),
            ("FamilyHealthRisk", Int(self.family_health_risk)),
            ("Obese", Int(self.obese)),
            ("SurgeryBurden_Low", Bool(self.surgery_burden_low)),
            ("SurgeryBurden_High", Bool(self.surgery_burden_high)),
        ]
    }

    /// Value of a single field by column name
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.values()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Set a single field by column name.
    ///
    /// Only the value kind is checked here; bounds are checked by
    /// [`FeatureRecord::validate`].
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), FieldViolation> {
        let spec = field(name).ok_or_else(|| FieldViolation::Unknown {
            field: name.to_string(),
        })?;
        let value = spec.check_kind(value)?;

        match (name, value) {
            ("Age", FieldValue::Int(v)) => self.age = v,
            ("Diabetes", FieldValue::Int(v)) => self.diabetes = v,
            ("BloodPressureProblems", FieldValue::Int(v)) => self.blood_pressure_problems = v,
            ("AnyTransplants", FieldValue::Int(v)) => self.any_transplants = v,
            ("AnyChronicDiseases", FieldValue::Int(v)) => self.any_chronic_diseases = v,
            ("Height", FieldValue::Int(v)) => self.height = v,
            ("Weight", FieldValue::Int(v)) => self.weight = v,
            ("KnownAllergies", FieldValue::Int(v)) => self.known_allergies = v,
            ("HistoryOfCancerInFamily", FieldValue::Int(v)) => self.history_of_cancer_in_family = v,
            ("NumberOfMajorSurgeries", FieldValue::Int(v)) => self.number_of_major_surgeries = v,
            ("Height_m", FieldValue::Float(v)) => self.height_m = v,
            ("BMI", FieldValue::Float(v)) => self.bmi = v,
            ("ChronicConditionCount", FieldValue::Int(v)) => self.chronic_condition_count = v,
            ("AgeGroup_31-45", FieldValue::Bool(v)) => self.age_group_31_45 = v,
            ("AgeGroup_46-66", FieldValue::Bool(v)) => self.age_group_46_66 = v,
            ("Weight_Height_Ratio", FieldValue::Float(v)) => self.weight_height_ratio = v,
            ("Age_ChronicInteraction", FieldValue::Float(v)) => self.age_chronic_interaction = v,
            ("Surgery_ChronicInteraction", FieldValue::Float(v)) => {
                self.surgery_chronic_interaction = v
            }
            ("HealthRiskScore", FieldValue::Int(v)) => self.health_risk_score = v,
            ("AgeQuantile", FieldValue::Int(v)) => self.age_quantile = v,
            ("FamilyHealthRisk", FieldValue::Int(v)) => self.family_health_risk = v,
            ("Obese", FieldValue::Int(v)) => self.obese = v,
            ("SurgeryBurden_Low", FieldValue::Bool(v)) => self.surgery_burden_low = v,
            ("SurgeryBurden_High", FieldValue::Bool(v)) => self.surgery_burden_high = v,
            _ => {
                return Err(FieldViolation::WrongKind {
                    field: name.to_string(),
                    expected: spec.kind.describe(),
                })
            }
        }
        Ok(())
    }

    /// Check every bounded field, reporting all violations at once
    pub fn validate(self) -> Result<Self, SchemaError> {
        let violations: Vec<FieldViolation> = FEATURE_SCHEMA
            .iter()
            .zip(self.values())
            .filter_map(|(spec, (_, value))| spec.check_bounds(value).err())
            .collect();

        if violations.is_empty() {
            Ok(self)
        } else {
            Err(SchemaError::new(violations))
        }
    }

    /// Build a validated record from a JSON object.
    ///
    /// Every schema field must be present with a value of the right kind and
    /// no other keys are allowed. Bounds are checked once the structure is
    /// sound.
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self, SchemaError> {
        let mut record = FeatureRecord::default();
        let mut violations = Vec::new();

        for key in object.keys() {
            if field(key).is_none() {
                violations.push(FieldViolation::Unknown { field: key.clone() });
            }
        }

        for spec in FEATURE_SCHEMA.iter() {
            let Some(raw) = object.get(spec.name) else {
                violations.push(FieldViolation::Missing {
                    field: spec.name.to_string(),
                });
                continue;
            };

            let result = FieldValue::from_json(raw)
                .ok_or_else(|| FieldViolation::WrongKind {
                    field: spec.name.to_string(),
                    expected: spec.kind.describe(),
                })
                .and_then(|value| record.set(spec.name, value));

            if let Err(violation) = result {
                violations.push(violation);
            }
        }

        if !violations.is_empty() {
            return Err(SchemaError::new(violations));
        }
        record.validate()
    }

    /// Single-row model input in canonical column order
    pub fn to_row(&self) -> FeatureRow {
        let mut row = [0.0; FEATURE_COUNT];
        for (slot, (_, value)) in row.iter_mut().zip(self.values()) {
            *slot = value.as_f64();
        }
        FeatureRow(row)
    }
}

/// The 24 feature values as a model sees them, in canonical column order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow([f64; FEATURE_COUNT]);

impl FeatureRow {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Build a row from an unchecked JSON object (API path).
    ///
    /// No bounds are enforced. The column set must match the schema exactly,
    /// since a model cannot be fed a frame with missing or foreign columns;
    /// booleans are fed as 1/0.
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self, InferenceError> {
        let missing: Vec<String> = FEATURE_SCHEMA
            .iter()
            .filter(|spec| !object.contains_key(spec.name))
            .map(|spec| spec.name.to_string())
            .collect();
        let unexpected: Vec<String> = object
            .keys()
            .filter(|key| field(key).is_none())
            .cloned()
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(InferenceError::FeatureMismatch {
                missing,
                unexpected,
            });
        }

        let mut row = [0.0; FEATURE_COUNT];
        for (slot, spec) in row.iter_mut().zip(FEATURE_SCHEMA.iter()) {
            let value = object
                .get(spec.name)
                .and_then(FieldValue::from_json)
                .ok_or_else(|| InferenceError::InvalidValue {
                    field: spec.name.to_string(),
                })?;
            *slot = value.as_f64();
        }
        Ok(FeatureRow(row))
    }
}
