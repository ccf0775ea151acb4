//! Line-oriented terminal driver for [`FormSession`]
//!
//! Prompts for every field section by section, then waits for an explicit
//! `submit`. Generic over reader and writer so it can be driven from stdin
//! or from a script.

use super::{CollectError, FormSession, InputCollector};
use crate::schema::{FeatureRecord, FieldKind, FieldSpec, FieldValue, Section, FEATURE_SCHEMA};
use std::io::{BufRead, Write};

const SECTIONS: [Section; 3] = [Section::Personal, Section::Health, Section::RiskScores];

/// Interactive form over a line reader and a writer
pub struct TerminalForm<R, W> {
    input: R,
    output: W,
    session: FormSession,
}

impl<R: BufRead, W: Write> TerminalForm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            session: FormSession::new(),
        }
    }

    /// Read one trimmed line; `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>, CollectError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt for a field until valid input arrives. Returns false at end of input.
    fn prompt_field(&mut self, spec: &FieldSpec) -> Result<bool, CollectError> {
        loop {
            let current = self
                .session
                .value(spec.name)
                .map(|v| display_value(spec, v))
                .unwrap_or_default();
            write!(self.output, "{}{} ({}): ", spec.label, hint(spec), current)?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(false);
            };

            match self.session.enter(spec.name, &line) {
                Ok(_) => return Ok(true),
                Err(violation) => writeln!(self.output, "  ! {violation}")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> InputCollector for TerminalForm<R, W> {
    fn collect(&mut self) -> Result<Option<FeatureRecord>, CollectError> {
        writeln!(self.output, "Insurance Premium Calculator")?;
        writeln!(
            self.output,
            "Enter your personal and health details. Press Enter to keep the value in brackets."
        )?;

        for section in SECTIONS {
            writeln!(self.output, "\n== {} ==", section.title())?;
            for spec in FEATURE_SCHEMA.iter().filter(|s| s.section == section) {
                if !self.prompt_field(spec)? {
                    return Ok(None);
                }
            }
        }

        loop {
            write!(
                self.output,
                "\nType 'submit' to predict, a field name to change it, or 'quit': "
            )?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };

            match line.as_str() {
                "submit" | "s" => match self.session.submit() {
                    Ok(record) => return Ok(Some(record)),
                    Err(err) => writeln!(self.output, "  ! {err}")?,
                },
                "quit" | "q" => return Ok(None),
                name => match crate::schema::field(name) {
                    Some(spec) => {
                        if !self.prompt_field(spec)? {
                            return Ok(None);
                        }
                    }
                    None => writeln!(self.output, "  ! unknown field '{name}'")?,
                },
            }
        }
    }
}

fn hint(spec: &FieldSpec) -> String {
    match spec.kind {
        FieldKind::Integer { min, max } => format!(" [{min}-{max}]"),
        FieldKind::Float { min, max } => format!(" [{min}-{max}]"),
        FieldKind::Numeric => String::new(),
        FieldKind::Flag => " [yes/no]".to_string(),
        FieldKind::Boolean => " [y/n]".to_string(),
    }
}

fn display_value(spec: &FieldSpec, value: FieldValue) -> String {
    match (spec.kind, value) {
        (FieldKind::Flag, FieldValue::Int(1)) => "Yes".to_string(),
        (FieldKind::Flag, FieldValue::Int(_)) => "No".to_string(),
        (FieldKind::Boolean, FieldValue::Bool(true)) => "y".to_string(),
        (FieldKind::Boolean, FieldValue::Bool(false)) => "n".to_string(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FEATURE_COUNT;
    use std::io::Cursor;

    fn run(script: &str) -> (Option<FeatureRecord>, String) {
        let mut output = Vec::new();
        let result = {
            let mut form = TerminalForm::new(Cursor::new(script.as_bytes()), &mut output);
            form.collect().unwrap()
        };
        (result, String::from_utf8(output).unwrap())
    }

    fn blanks() -> String {
        "\n".repeat(FEATURE_COUNT)
    }

    #[test]
    fn test_defaults_then_submit() {
        let (record, output) = run(&format!("{}submit\n", blanks()));
        assert_eq!(record, Some(FeatureRecord::default()));
        assert!(output.contains("== Personal Details =="));
        assert!(output.contains("Age [18-100] (35): "));
        assert!(output.contains("Blood Pressure Problems [yes/no] (Yes): "));
    }

    #[test]
    fn test_no_record_without_submit() {
        let (record, _) = run(&blanks());
        assert_eq!(record, None);
    }

    #[test]
    fn test_quit_abandons_form() {
        let (record, _) = run(&format!("{}quit\n", blanks()));
        assert_eq!(record, None);
    }

    #[test]
    fn test_out_of_range_is_reprompted() {
        // Age is asked first: an invalid value, then a valid one.
        let script = format!("150\n40\n{}submit\n", "\n".repeat(FEATURE_COUNT - 1));
        let (record, output) = run(&script);
        assert_eq!(record.unwrap().age, 40);
        assert!(output.contains("Age=150 is outside [18, 100]"));
    }

    #[test]
    fn test_edit_field_before_submit() {
        let script = format!("{}BMI\n31.2\nsubmit\n", blanks());
        let (record, _) = run(&script);
        assert_eq!(record.unwrap().bmi, 31.2);
    }

    #[test]
    fn test_unknown_field_at_submit_prompt() {
        let script = format!("{}Income\nsubmit\n", blanks());
        let (record, output) = run(&script);
        assert!(record.is_some());
        assert!(output.contains("unknown field 'Income'"));
    }
}
