//! Bedtime calculation
//!
//! The caller side of the predictor contract: load the model, predict the
//! sleep duration, derive the bedtime. Every failure is logged and counted
//! by cause, then shown to the user as the same generic error.

use crate::error::PredictorError;
use crate::models::{DisplayResult, ModelMetadata, PredictionInput};
use crate::observability::{BedtimeMetrics, StructuredLogger};
use crate::predictor::{derive_bedtime, Bedtime, ModelLoader, TimeStyle};
use std::time::Instant;

/// Computes bedtimes on demand.
///
/// The model is loaded fresh for every calculation; nothing is cached
/// between calls.
pub struct BedtimeCalculator<L: ModelLoader> {
    loader: L,
    style: TimeStyle,
    metrics: BedtimeMetrics,
    logger: StructuredLogger,
}

impl<L: ModelLoader> BedtimeCalculator<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            style: TimeStyle::default(),
            metrics: BedtimeMetrics::new(),
            logger: StructuredLogger::new("calculator"),
        }
    }

    pub fn with_style(mut self, style: TimeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn metrics(&self) -> &BedtimeMetrics {
        &self.metrics
    }

    /// Load the model and describe it without predicting
    pub fn model_metadata(&self) -> Result<ModelMetadata, PredictorError> {
        let predictor = self.loader.load()?;
        Ok(predictor.metadata().clone())
    }

    /// Predict the bedtime, keeping the failure cause
    pub fn bedtime(&self, input: &PredictionInput) -> Result<Bedtime, PredictorError> {
        let start = Instant::now();
        let result = self.run(input);
        self.metrics
            .observe_prediction_latency(start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => self.metrics.inc_predictions(),
            Err(e) => {
                self.metrics.inc_failures(e.kind());
                self.logger.log_prediction_failure(e.kind(), &e.to_string());
            }
        }
        result
    }

    /// Predict the bedtime and render it for display. Never fails: any
    /// error becomes the generic error result.
    pub fn calculate(&self, input: &PredictionInput) -> DisplayResult {
        DisplayResult::from_result(&self.bedtime(input), self.style)
    }

    fn run(&self, input: &PredictionInput) -> Result<Bedtime, PredictorError> {
        let predictor = self.loader.load()?;
        let metadata = predictor.metadata();
        self.metrics
            .set_model_info(&metadata.version, metadata.format.as_str());
        self.logger
            .log_model_loaded(&metadata.version, metadata.format.as_str());

        let output = predictor.predict(input)?;
        let bedtime = derive_bedtime(input.wake_time(), output.predicted_sleep_hours);

        self.logger.log_prediction(
            input.wake_seconds(),
            input.sleep_hours(),
            input.coffee_cups(),
            output.predicted_sleep_hours,
            &bedtime.format(self.style),
            &output.model_version,
        );
        Ok(bedtime)
    }
}
