//! Bedtime prediction library
//!
//! This crate provides the core functionality for:
//! - Loading pre-trained sleep regression models (ONNX or linear JSON)
//! - Predicting the sleep duration for a wake time, sleep goal and coffee intake
//! - Deriving and formatting the ideal bedtime
//! - Metrics and structured logging

pub mod calculator;
pub mod error;
pub mod models;
pub mod observability;
pub mod predictor;

pub use calculator::BedtimeCalculator;
pub use error::{InputError, PredictorError};
pub use models::*;
pub use observability::{BedtimeMetrics, StructuredLogger};
