//! Prediction commands: interactive form, record file, remote server

use anyhow::{Context, Result};
use colored::Colorize;
use premium_lib::{
    InferenceInvoker, InputCollector, JsonFileCollector, ModelRegistry, PremiumMetrics,
    StructuredLogger, TerminalForm, DEFAULT_API_MODEL,
};
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use crate::client::ApiClient;
use crate::config::Settings;
use crate::output::{format_currency, presenter, print_success, print_warning, OutputFormat};

/// Load every configured model; any failure aborts the command
pub fn load_registry(settings: &Settings) -> Result<ModelRegistry> {
    let default_model = settings
        .models
        .iter()
        .find(|spec| spec.name == DEFAULT_API_MODEL)
        .or_else(|| settings.models.first())
        .map(|spec| spec.name.as_str())
        .unwrap_or(DEFAULT_API_MODEL);

    ModelRegistry::load(&settings.models, &settings.model_dir, default_model)
        .with_context(|| format!("Failed to load models from {}", settings.model_dir.display()))
}

/// Collect a record, run every model on it and present the results
fn predict_with<C: InputCollector>(settings: &Settings, collector: &mut C, out: &mut dyn Write) -> Result<()> {
    let registry = load_registry(settings)?;

    let Some(record) = collector.collect()? else {
        print_warning("Form closed without submitting; nothing predicted");
        return Ok(());
    };

    let start = Instant::now();
    let results = InferenceInvoker::new().predict_all(&registry, &record)?;

    let metrics = PremiumMetrics::new();
    let logger = StructuredLogger::new("premium-cli");
    for result in &results {
        metrics.observe_prediction_latency(&result.model, result.elapsed.as_secs_f64());
        logger.log_prediction(&result.model, result.premium, result.elapsed.as_micros() as u64, "interactive");
    }
    metrics.inc_predictions_served("interactive");
    debug!(models = results.len(), elapsed_us = start.elapsed().as_micros() as u64, "Predicted with all models");

    presenter(settings.format).present(&results, out)
}

/// Interactive terminal form on stdin/stdout
pub fn run_form(settings: &Settings) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut form = TerminalForm::new(stdin.lock(), io::stdout());
    predict_with(settings, &mut form, &mut stdout)
}

/// Same as the form, with the record read from a JSON file
pub fn run_file(settings: &Settings, input: &Path) -> Result<()> {
    let mut collector = JsonFileCollector::new(input);
    predict_with(settings, &mut collector, &mut io::stdout())
        .with_context(|| format!("Prediction for {} failed", input.display()))
}

/// Send a record file to a running API server
pub async fn run_remote(settings: &Settings, input: &Path) -> Result<()> {
    let record = JsonFileCollector::new(input)
        .collect()?
        .context("Record file is empty")?;

    let client = ApiClient::new(&settings.api_url)?;
    let response = client.predict(&record).await?;

    match settings.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Table => {
            print_success(&format!("Prediction from {}", settings.api_url));
            println!(
                "{} {}",
                "Predicted premium:".bold(),
                format_currency(response.predicted_premium).green().bold()
            );
        }
    }

    Ok(())
}
