//! Server configuration
//!
//! Read from an optional `premium.{toml,json,yaml}` in the working directory
//! (or the file named by `PREMIUM_CONFIG`), overridden by `PREMIUM__*`
//! environment variables, e.g. `PREMIUM__PORT=9000`.

use anyhow::{Context, Result};
use premium_lib::{default_model_specs, ModelSpec, DEFAULT_API_MODEL};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base directory for relative model paths
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Models to load at startup, in display order
    #[serde(default = "default_model_specs")]
    pub models: Vec<ModelSpec>,

    /// Model answering `POST /predict`
    #[serde(default = "default_api_model")]
    pub api_model: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_api_model() -> String {
    DEFAULT_API_MODEL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            model_dir: default_model_dir(),
            models: default_model_specs(),
            api_model: default_api_model(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the config file and environment
    pub fn load() -> Result<Self> {
        match std::env::var_os("PREMIUM_CONFIG") {
            Some(path) => Self::load_from(Some(Path::new(&path))),
            None => Self::load_from(None),
        }
    }

    /// Load from an explicit file (required) or the optional default file
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("premium").required(false),
        };

        let config = config::Config::builder()
            .add_source(source)
            .add_source(
                config::Environment::with_prefix("PREMIUM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }
}
