//! ONNX inference using tract
//!
//! Runs a sleep regression model exported to ONNX. The graph takes one
//! `[1, 3]` f32 input (wake seconds, estimated sleep hours, coffee cups).
//! The first value of its first output is the predicted sleep, in hours
//! unless configured otherwise. Numeric outputs of any type are cast to f32.

use super::Predictor;
use crate::error::PredictorError;
use crate::models::{ModelFormat, ModelMetadata, OutputUnit, PredictionInput, PredictionOutput};
use anyhow::Context;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Number of input features expected by the model
const NUM_FEATURES: usize = 3;

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based predictor using tract for lightweight inference
pub struct OnnxPredictor {
    model: TractModel,
    metadata: ModelMetadata,
    output_unit: OutputUnit,
}

impl std::fmt::Debug for OnnxPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxPredictor")
            .field("metadata", &self.metadata)
            .field("output_unit", &self.output_unit)
            .finish_non_exhaustive()
    }
}

impl OnnxPredictor {
    /// Create a new predictor from model bytes
    pub fn new(model_bytes: &[u8], version: &str) -> TractResult<Self> {
        let model = Self::load_model(model_bytes)?;
        Ok(Self {
            model,
            metadata: ModelMetadata {
                version: version.to_string(),
                format: ModelFormat::Onnx,
            },
            output_unit: OutputUnit::Hours,
        })
    }

    /// Unit of the model's output value
    pub fn with_output_unit(mut self, unit: OutputUnit) -> Self {
        self.output_unit = unit;
        self
    }

    /// Load and optimize an ONNX model from bytes
    fn load_model(model_bytes: &[u8]) -> TractResult<TractModel> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, NUM_FEATURES]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    /// Convert inputs to the model's input tensor
    fn input_tensor(input: &PredictionInput) -> TractResult<Tensor> {
        let data: Vec<f32> = input
            .features()
            .to_array()
            .iter()
            .map(|v| *v as f32)
            .collect();
        let array = tract_ndarray::Array2::from_shape_vec((1, NUM_FEATURES), data)?;
        Ok(array.into())
    }

    fn run(&self, input: &PredictionInput) -> TractResult<f32> {
        let tensor = Self::input_tensor(input)?;
        let result = self.model.run(tvec!(tensor.into()))?;
        let output = result.first().context("No output from model")?;
        let output = output
            .cast_to::<f32>()
            .context("Model output is not numeric")?;
        let value = output
            .to_array_view::<f32>()?
            .iter()
            .next()
            .copied()
            .context("Model output is empty")?;
        Ok(value)
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, input: &PredictionInput) -> Result<PredictionOutput, PredictorError> {
        let start = Instant::now();

        let value = self
            .run(input)
            .map_err(|e| PredictorError::inference(format!("{:#}", e)))?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(
                elapsed_ms = elapsed.as_millis(),
                "Inference exceeded {}ms target",
                MAX_INFERENCE_MS
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        PredictionOutput::from_model_value(value as f64, self.output_unit, &self.metadata.version)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage_bytes() {
        assert!(OnnxPredictor::new(b"\x00\x01\x02not-an-onnx-graph", "v1").is_err());
    }

    #[test]
    fn test_input_tensor_shape() {
        let input = PredictionInput::new(25_200, 8.0, 1).unwrap();
        let tensor = OnnxPredictor::input_tensor(&input).unwrap();
        assert_eq!(tensor.shape(), &[1, NUM_FEATURES]);
        let values: Vec<f32> = tensor
            .to_array_view::<f32>()
            .unwrap()
            .iter()
            .copied()
            .collect();
        assert_eq!(values, vec![25_200.0, 8.0, 1.0]);
    }
}
