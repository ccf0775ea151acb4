//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use premium_lib::PredictionResult;
use serde::Serialize;
use std::io::Write;
use tabled::{settings::Style, Table, Tabled};

/// Width of the longest bar in the comparison chart
const BAR_WIDTH: usize = 40;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Renders per-model premium estimates
pub trait ResultPresenter {
    fn present(&self, results: &[PredictionResult], out: &mut dyn Write) -> Result<()>;
}

/// Pick the presenter for an output format
pub fn presenter(format: OutputFormat) -> Box<dyn ResultPresenter> {
    match format {
        OutputFormat::Table => Box::new(TablePresenter),
        OutputFormat::Json => Box::new(JsonPresenter),
    }
}

/// Table of premiums followed by a bar chart; highest premium in green, lowest in red
pub struct TablePresenter;

#[derive(Tabled)]
struct PremiumRow {
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Predicted Premium")]
    premium: String,
}

impl ResultPresenter for TablePresenter {
    fn present(&self, results: &[PredictionResult], out: &mut dyn Write) -> Result<()> {
        if results.is_empty() {
            writeln!(out, "{}", "No predictions".yellow())?;
            return Ok(());
        }

        let (highest, lowest) = extremes(results);
        let rows: Vec<PremiumRow> = results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let premium = format_currency(result.premium);
                PremiumRow {
                    model: result.model.clone(),
                    premium: if i == highest {
                        premium.green().bold().to_string()
                    } else if i == lowest {
                        premium.red().bold().to_string()
                    } else {
                        premium
                    },
                }
            })
            .collect();

        writeln!(out, "{}", "Predicted Insurance Premiums".bold())?;
        writeln!(out, "{}", Table::new(rows).with(Style::rounded()))?;
        writeln!(out)?;
        write_bar_chart(results, out)?;
        Ok(())
    }
}

/// Pretty-printed JSON array of results
pub struct JsonPresenter;

impl ResultPresenter for JsonPresenter {
    fn present(&self, results: &[PredictionResult], out: &mut dyn Write) -> Result<()> {
        writeln!(out, "{}", serde_json::to_string_pretty(results)?)?;
        Ok(())
    }
}

/// Indices of the highest and lowest premium; the first wins on ties
pub fn extremes(results: &[PredictionResult]) -> (usize, usize) {
    let mut highest = 0;
    let mut lowest = 0;
    for (i, result) in results.iter().enumerate() {
        if result.premium > results[highest].premium {
            highest = i;
        }
        if result.premium < results[lowest].premium {
            lowest = i;
        }
    }
    (highest, lowest)
}

/// Bar length for a premium, scaled so the largest premium fills the chart
pub fn bar_length(premium: f64, max: f64) -> usize {
    if max <= 0.0 || premium <= 0.0 {
        return 0;
    }
    ((premium / max) * BAR_WIDTH as f64).round() as usize
}

fn write_bar_chart(results: &[PredictionResult], out: &mut dyn Write) -> Result<()> {
    let label_width = results.iter().map(|r| r.model.len()).max().unwrap_or(0);
    let max = results
        .iter()
        .map(|r| r.premium)
        .fold(f64::NEG_INFINITY, f64::max);

    writeln!(out, "{}", "Premium Comparison".bold())?;
    for result in results {
        writeln!(
            out,
            "{:<width$}  {} {}",
            result.model,
            "█".repeat(bar_length(result.premium, max)).cyan(),
            format_currency(result.premium),
            width = label_width
        )?;
    }
    Ok(())
}

/// Print items as a table or JSON
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Format a premium as dollars with two decimals
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(model: &str, premium: f64) -> PredictionResult {
        PredictionResult {
            model: model.to_string(),
            premium,
            raw: premium,
            elapsed: Duration::ZERO,
        }
    }

    fn sample() -> Vec<PredictionResult> {
        vec![
            result("Random Forest", 24150.5),
            result("Decision Tree", 31000.0),
            result("XGBoost", 23873.12),
            result("Linear Regression", 25210.0),
        ]
    }

    fn render(presenter: &dyn ResultPresenter, results: &[PredictionResult]) -> String {
        let mut out = Vec::new();
        presenter.present(results, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_extremes() {
        assert_eq!(extremes(&sample()), (1, 2));
        assert_eq!(extremes(&[result("Only", 100.0)]), (0, 0));
    }

    #[test]
    fn test_extremes_ties_keep_first() {
        let results = vec![result("A", 5.0), result("B", 5.0), result("C", 1.0)];
        assert_eq!(extremes(&results), (0, 2));
    }

    #[test]
    fn test_bar_length_scaled_to_max() {
        assert_eq!(bar_length(31000.0, 31000.0), BAR_WIDTH);
        assert_eq!(bar_length(15500.0, 31000.0), BAR_WIDTH / 2);
        assert_eq!(bar_length(-10.0, 31000.0), 0);
        assert_eq!(bar_length(10.0, 0.0), 0);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(23873.12), "$23873.12");
        assert_eq!(format_currency(31000.0), "$31000.00");
    }

    #[test]
    fn test_table_presenter_lists_models_in_order() {
        let text = render(&TablePresenter, &sample());

        let positions: Vec<usize> = ["Random Forest", "Decision Tree", "XGBoost", "Linear Regression"]
            .iter()
            .map(|name| text.find(name).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("$24150.50"));
        assert!(text.contains("Premium Comparison"));
    }

    #[test]
    fn test_table_presenter_highlights_extremes() {
        colored::control::set_override(true);
        let text = render(&TablePresenter, &sample());

        let highest = "$31000.00".green().bold().to_string();
        let lowest = "$23873.12".red().bold().to_string();
        assert!(text.contains(&highest));
        assert!(text.contains(&lowest));
    }

    #[test]
    fn test_table_presenter_empty() {
        assert!(render(&TablePresenter, &[]).contains("No predictions"));
    }

    #[test]
    fn test_json_presenter() {
        let text = render(&JsonPresenter, &sample()[..2]);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value[0]["model"], "Random Forest");
        assert_eq!(value[0]["predicted_premium"], 24150.5);
        assert_eq!(value[1]["raw_prediction"], 31000.0);
        assert!(value[0].get("elapsed").is_none());
    }
}
