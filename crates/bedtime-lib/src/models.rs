//! Core data models for bedtime prediction

use crate::error::{InputError, PredictorError};
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const SECONDS_PER_DAY: u32 = 86_400;

pub const MIN_SLEEP_HOURS: f64 = 1.0;
pub const MAX_SLEEP_HOURS: f64 = 12.0;
pub const MAX_COFFEE_CUPS: u32 = 20;

pub const DEFAULT_WAKE_HOUR: u32 = 7;
pub const DEFAULT_SLEEP_HOURS: f64 = 8.0;
pub const DEFAULT_COFFEE_CUPS: u32 = 1;

/// Model feature names, in the order the model expects them
pub const FEATURE_NAMES: [&str; 3] = ["wake", "estimated_sleep", "coffee"];

/// The three user inputs for one bedtime calculation.
///
/// Ranges are checked on construction, so every value of this type is
/// within the ranges the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionInput {
    wake_seconds: u32,
    sleep_hours: f64,
    coffee_cups: u32,
}

impl PredictionInput {
    pub fn new(wake_seconds: u32, sleep_hours: f64, coffee_cups: u32) -> Result<Self, InputError> {
        if wake_seconds >= SECONDS_PER_DAY {
            return Err(InputError::WakeOutOfRange(wake_seconds));
        }
        if !(MIN_SLEEP_HOURS..=MAX_SLEEP_HOURS).contains(&sleep_hours) {
            return Err(InputError::SleepOutOfRange(sleep_hours));
        }
        if coffee_cups > MAX_COFFEE_CUPS {
            return Err(InputError::CoffeeOutOfRange(coffee_cups));
        }
        Ok(Self {
            wake_seconds,
            sleep_hours,
            coffee_cups,
        })
    }

    /// Build from a time of day. Seconds are ignored.
    pub fn from_wake_time(
        wake: NaiveTime,
        sleep_hours: f64,
        coffee_cups: u32,
    ) -> Result<Self, InputError> {
        let wake_seconds = wake.hour() * 3600 + wake.minute() * 60;
        Self::new(wake_seconds, sleep_hours, coffee_cups)
    }

    pub fn wake_seconds(&self) -> u32 {
        self.wake_seconds
    }

    pub fn sleep_hours(&self) -> f64 {
        self.sleep_hours
    }

    pub fn coffee_cups(&self) -> u32 {
        self.coffee_cups
    }

    pub fn wake_time(&self) -> NaiveTime {
        // wake_seconds < SECONDS_PER_DAY is checked in `new`
        NaiveTime::from_num_seconds_from_midnight_opt(self.wake_seconds, 0).unwrap_or_default()
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector {
            wake: self.wake_seconds as f64,
            estimated_sleep: self.sleep_hours,
            coffee: self.coffee_cups as f64,
        }
    }
}

impl Default for PredictionInput {
    fn default() -> Self {
        Self {
            wake_seconds: DEFAULT_WAKE_HOUR * 3600,
            sleep_hours: DEFAULT_SLEEP_HOURS,
            coffee_cups: DEFAULT_COFFEE_CUPS,
        }
    }
}

/// Parse a wake time written as `HH:MM`
pub fn parse_wake_time(value: &str) -> Result<NaiveTime, InputError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| InputError::InvalidWakeTime(value.to_string()))
}

/// Feature vector for ML inference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Wake time in seconds since midnight
    pub wake: f64,
    /// Desired sleep in hours
    pub estimated_sleep: f64,
    /// Daily coffee cups
    pub coffee: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; 3] {
        [self.wake, self.estimated_sleep, self.coffee]
    }
}

/// Predicted sleep duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub predicted_sleep_hours: f64,
    pub model_version: String,
}

impl PredictionOutput {
    /// Wrap a raw model value, rejecting NaN and infinities
    pub fn from_model_value(
        value: f64,
        unit: OutputUnit,
        model_version: &str,
    ) -> Result<Self, PredictorError> {
        if !value.is_finite() {
            return Err(PredictorError::inference(format!(
                "Model produced a non-finite value: {}",
                value
            )));
        }
        Ok(Self {
            predicted_sleep_hours: unit.to_hours(value),
            model_version: model_version.to_string(),
        })
    }
}

/// Unit of the value a regression model emits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputUnit {
    #[default]
    Hours,
    Seconds,
}

impl OutputUnit {
    pub fn to_hours(self, value: f64) -> f64 {
        match self {
            OutputUnit::Hours => value,
            OutputUnit::Seconds => value / 3600.0,
        }
    }
}

/// On-disk model artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Onnx,
    Linear,
}

impl ModelFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "onnx" => Some(ModelFormat::Onnx),
            "json" => Some(ModelFormat::Linear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFormat::Onnx => "onnx",
            ModelFormat::Linear => "linear",
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of a loaded model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub version: String,
    pub format: ModelFormat,
}

/// Title and message shown to the user after a calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayResult {
    pub title: String,
    pub message: String,
}
