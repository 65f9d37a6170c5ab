//! Linear regression models described as JSON
//!
//! A tabular regressor over the three sleep features reduces to an
//! intercept and one weight per feature, so the artifact is just those
//! numbers plus a version label.

use super::Predictor;
use crate::error::PredictorError;
use crate::models::{ModelFormat, ModelMetadata, OutputUnit, PredictionInput, PredictionOutput};
use serde::{Deserialize, Serialize};

/// Per-feature weights, named after the model features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearWeights {
    pub wake: f64,
    pub estimated_sleep: f64,
    pub coffee: f64,
}

/// Serialized form of a linear sleep model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModelSpec {
    pub version: String,
    #[serde(default)]
    pub output_unit: OutputUnit,
    pub intercept: f64,
    pub weights: LinearWeights,
}

/// Predictor evaluating `intercept + w . features`
#[derive(Debug, Clone)]
pub struct LinearPredictor {
    spec: LinearModelSpec,
    metadata: ModelMetadata,
}

impl LinearPredictor {
    pub fn new(spec: LinearModelSpec) -> Self {
        let metadata = ModelMetadata {
            version: spec.version.clone(),
            format: ModelFormat::Linear,
        };
        Self { spec, metadata }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let spec: LinearModelSpec = serde_json::from_slice(bytes)?;
        Ok(Self::new(spec))
    }

    pub fn spec(&self) -> &LinearModelSpec {
        &self.spec
    }

    fn evaluate(&self, input: &PredictionInput) -> f64 {
        let features = input.features();
        let w = &self.spec.weights;
        self.spec.intercept
            + w.wake * features.wake
            + w.estimated_sleep * features.estimated_sleep
            + w.coffee * features.coffee
    }
}

impl Predictor for LinearPredictor {
    fn predict(&self, input: &PredictionInput) -> Result<PredictionOutput, PredictorError> {
        let value = self.evaluate(input);
        PredictionOutput::from_model_value(value, self.spec.output_unit, &self.metadata.version)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}
