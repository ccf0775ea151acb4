//! Insurance premium predictor CLI
//!
//! Collects an applicant's details (interactively or from a file), compares
//! the premium estimates of every configured model, and talks to a running
//! premium-api server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{predict, schema};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Insurance Premium Predictor CLI
#[derive(Parser)]
#[command(name = "premium")]
#[command(author, version, about = "CLI for the Insurance Premium Predictor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via PREMIUM_API_URL env var)
    #[arg(long, env = "PREMIUM_API_URL")]
    pub api_url: Option<String>,

    /// Path to the config file (default: ~/.config/premium/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in the premium calculator form and compare all models
    Form,

    /// Predict with all models from a JSON record file
    Predict {
        /// JSON file with all feature fields
        #[arg(long, short)]
        input: PathBuf,
    },

    /// Send a JSON record file to a running premium-api server
    Remote {
        /// JSON file with all feature fields
        #[arg(long, short)]
        input: PathBuf,
    },

    /// List the feature schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let file_config = config::Config::load(cli.config.as_deref())?;
    let settings = config::Settings::resolve(file_config, cli.api_url, cli.format)?;

    // Execute command
    match cli.command {
        Commands::Form => predict::run_form(&settings)?,
        Commands::Predict { input } => predict::run_file(&settings, &input)?,
        Commands::Remote { input } => predict::run_remote(&settings, &input).await?,
        Commands::Schema => schema::show_schema(settings.format)?,
    }

    Ok(())
}
