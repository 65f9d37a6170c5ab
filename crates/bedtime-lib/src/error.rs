//! Error types for bedtime prediction

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading or querying a sleep model.
#[derive(Error, Debug)]
pub enum PredictorError {
    /// The model artifact could not be read, verified or parsed
    #[error("Model unavailable at {path:?}: {reason}")]
    ModelUnavailable { path: PathBuf, reason: String },

    /// The model loaded but evaluating it failed
    #[error("Inference failed: {0}")]
    Inference(String),
}

impl PredictorError {
    pub fn model_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ModelUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn inference(reason: impl ToString) -> Self {
        Self::Inference(reason.to_string())
    }

    /// Short label used in logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ModelUnavailable { .. } => "model_unavailable",
            Self::Inference(_) => "inference",
        }
    }
}

/// Rejected prediction inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Wake time must be under 86400 seconds since midnight, got {0}")]
    WakeOutOfRange(u32),

    #[error("Desired sleep must be between 1 and 12 hours, got {0}")]
    SleepOutOfRange(f64),

    #[error("Coffee intake must be between 0 and 20 cups, got {0}")]
    CoffeeOutOfRange(u32),

    #[error("Invalid wake time '{0}', expected HH:MM")]
    InvalidWakeTime(String),
}
