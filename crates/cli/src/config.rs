//! Configuration management for the CLI

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use clap::ValueEnum;
use premium_lib::{default_model_specs, ModelSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// CLI configuration file contents; every field is optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
    /// Base directory for relative model paths
    pub model_dir: Option<PathBuf>,
    /// Models to compare on the local path
    pub models: Option<Vec<ModelSpec>>,
    /// Default output format ("table" or "json")
    pub default_format: Option<String>,
}

impl Config {
    /// Load the configuration file, or the per-user default if no path is given.
    ///
    /// A missing per-user file yields the defaults; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                Self::load_from(&path)
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("premium").join("config.json"))
    }
}

/// Effective settings after merging flags, config file and defaults
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub model_dir: PathBuf,
    pub models: Vec<ModelSpec>,
    pub format: OutputFormat,
}

impl Settings {
    /// Command-line values take precedence over the config file
    pub fn resolve(config: Config, api_url: Option<String>, format: Option<OutputFormat>) -> Result<Self> {
        let format = match (format, config.default_format) {
            (Some(format), _) => format,
            (None, Some(name)) => OutputFormat::from_str(&name, true)
                .map_err(|e| anyhow::anyhow!("Invalid default_format in config: {}", e))?,
            (None, None) => OutputFormat::default(),
        };

        Ok(Self {
            api_url: api_url
                .or(config.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model_dir: config.model_dir.unwrap_or_else(|| PathBuf::from("models")),
            models: config.models.unwrap_or_else(default_model_specs),
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_config() {
        let settings = Settings::resolve(Config::default(), None, None).unwrap();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.model_dir, PathBuf::from("models"));
        assert_eq!(settings.models.len(), 4);
        assert!(matches!(settings.format, OutputFormat::Table));
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            api_url: Some("http://premium.internal:8080".to_string()),
            default_format: Some("json".to_string()),
            ..Config::default()
        };

        let settings = Settings::resolve(
            config,
            Some("http://127.0.0.1:9000".to_string()),
            Some(OutputFormat::Table),
        )
        .unwrap();
        assert_eq!(settings.api_url, "http://127.0.0.1:9000");
        assert!(matches!(settings.format, OutputFormat::Table));
    }

    #[test]
    fn test_config_format_used_when_no_flag() {
        let config = Config {
            default_format: Some("JSON".to_string()),
            ..Config::default()
        };
        let settings = Settings::resolve(config, None, None).unwrap();
        assert!(matches!(settings.format, OutputFormat::Json));
    }

    #[test]
    fn test_invalid_config_format() {
        let config = Config {
            default_format: Some("yaml".to_string()),
            ..Config::default()
        };
        assert!(Settings::resolve(config, None, None).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "model_dir": "/opt/premium/models",
                "models": [{{"name": "XGBoost", "path": "xgb.json"}}]
            }}"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.model_dir, Some(PathBuf::from("/opt/premium/models")));
        assert_eq!(config.models, Some(vec![ModelSpec::new("XGBoost", "xgb.json")]));
        assert!(config.api_url.is_none());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        assert!(Config::load(Some(Path::new("/nonexistent/premium.json"))).is_err());
    }
}
