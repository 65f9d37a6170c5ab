//! Configuration management for the CLI
//!
//! Values are layered: built-in defaults, then an optional config file,
//! then `BETTERREST_*` environment variables.

use anyhow::{Context, Result};
use bedtime_lib::predictor::TimeStyle;
use bedtime_lib::{OutputUnit, DEFAULT_COFFEE_CUPS, DEFAULT_SLEEP_HOURS, DEFAULT_WAKE_HOUR};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `BETTERREST_MODEL_PATH`
const ENV_PREFIX: &str = "BETTERREST";

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Model artifact (`.onnx` or linear `.json`)
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Expected hex SHA-256 of the model artifact
    #[serde(default)]
    pub model_sha256: Option<String>,

    /// Unit of an ONNX model's output (`hours` or `seconds`)
    #[serde(default)]
    pub model_output_unit: OutputUnit,

    /// Wake time used when `--wake` is not given (HH:MM)
    #[serde(default = "default_wake_time")]
    pub default_wake_time: String,

    #[serde(default = "default_sleep_hours")]
    pub default_sleep_hours: f64,

    #[serde(default = "default_coffee_cups")]
    pub default_coffee_cups: u32,

    #[serde(default)]
    pub time_style: TimeStyle,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/sleep_calculator.json")
}

fn default_wake_time() -> String {
    format!("{:02}:00", DEFAULT_WAKE_HOUR)
}

fn default_sleep_hours() -> f64 {
    DEFAULT_SLEEP_HOURS
}

fn default_coffee_cups() -> u32 {
    DEFAULT_COFFEE_CUPS
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            model_sha256: None,
            model_output_unit: OutputUnit::default(),
            default_wake_time: default_wake_time(),
            default_sleep_hours: default_sleep_hours(),
            default_coffee_cups: default_coffee_cups(),
            time_style: TimeStyle::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration.
    ///
    /// An explicitly given file must exist; the default file is optional.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match explicit_path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    builder = builder.add_source(config::File::from(path).required(false));
                }
            }
        }

        let config = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// `<config dir>/betterrest/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("betterrest").join("config.toml"))
    }
}
