//! Feature schema listing

use anyhow::Result;
use premium_lib::{FieldKind, FieldSpec, FEATURE_SCHEMA};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_table, OutputFormat};

/// Row for the schema table
#[derive(Tabled, Serialize)]
struct FieldRow {
    #[tabled(rename = "Field")]
    name: &'static str,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Section")]
    section: &'static str,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Bounds")]
    bounds: String,
    #[tabled(rename = "Default")]
    default: String,
}

impl From<&FieldSpec> for FieldRow {
    fn from(spec: &FieldSpec) -> Self {
        Self {
            name: spec.name,
            label: spec.label,
            section: spec.section.title(),
            kind: kind_name(spec.kind),
            bounds: spec
                .kind
                .bounds()
                .map(|(min, max)| format!("[{}, {}]", min, max))
                .unwrap_or_else(|| "-".to_string()),
            default: spec.default.to_string(),
        }
    }
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Integer { .. } => "integer",
        FieldKind::Float { .. } => "float",
        FieldKind::Numeric => "number",
        FieldKind::Flag => "yes/no",
        FieldKind::Boolean => "checkbox",
    }
}

/// Print every schema field in model column order
pub fn show_schema(format: OutputFormat) -> Result<()> {
    let rows: Vec<FieldRow> = FEATURE_SCHEMA.iter().map(FieldRow::from).collect();
    print_table(&rows, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use premium_lib::FEATURE_COUNT;

    #[test]
    fn test_rows_follow_column_order() {
        let rows: Vec<FieldRow> = FEATURE_SCHEMA.iter().map(FieldRow::from).collect();
        assert_eq!(rows.len(), FEATURE_COUNT);
        assert_eq!(rows[0].name, "Age");
        assert_eq!(rows[0].bounds, "[18, 100]");
        assert_eq!(rows[0].default, "35");
        assert_eq!(rows[FEATURE_COUNT - 1].name, "SurgeryBurden_High");
    }

    #[test]
    fn test_kind_names() {
        let row = |name: &str| FieldRow::from(premium_lib::schema::field(name).unwrap());
        assert_eq!(row("Diabetes").kind, "yes/no");
        assert_eq!(row("Diabetes").bounds, "[0, 1]");
        assert_eq!(row("BMI").kind, "float");
        assert_eq!(row("AgeGroup_31-45").kind, "checkbox");
        assert_eq!(row("Weight_Height_Ratio").bounds, "-");
    }
}
