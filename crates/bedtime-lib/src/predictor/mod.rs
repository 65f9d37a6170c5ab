//! ML prediction engine

mod inference;
mod linear;
mod output;

pub use inference::OnnxPredictor;
pub use linear::{LinearModelSpec, LinearPredictor, LinearWeights};
pub use output::{
    coffee_label, derive_bedtime, sleep_label, Bedtime, TimeStyle, ERROR_MESSAGE, ERROR_TITLE,
    SUCCESS_TITLE,
};

use crate::error::PredictorError;
use crate::models::{ModelFormat, ModelMetadata, OutputUnit, PredictionInput, PredictionOutput};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Trait for prediction implementations
pub trait Predictor: Send + Sync {
    /// Predict the sleep duration in hours for one set of inputs
    fn predict(&self, input: &PredictionInput) -> Result<PredictionOutput, PredictorError>;

    /// Describe the loaded model
    fn metadata(&self) -> &ModelMetadata;
}

/// Produces a ready-to-query model
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<Box<dyn Predictor>, PredictorError>;
}

/// Loads a model artifact from disk, picking the format from the extension
#[derive(Debug, Clone)]
pub struct FileModelLoader {
    path: PathBuf,
    expected_sha256: Option<String>,
    onnx_output_unit: OutputUnit,
}

impl FileModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            expected_sha256: None,
            onnx_output_unit: OutputUnit::Hours,
        }
    }

    /// Require the artifact bytes to match a hex SHA-256 digest
    pub fn with_checksum(mut self, sha256_hex: impl Into<String>) -> Self {
        self.expected_sha256 = Some(sha256_hex.into());
        self
    }

    /// Unit of an ONNX model's output. Linear models declare their own.
    pub fn with_output_unit(mut self, unit: OutputUnit) -> Self {
        self.onnx_output_unit = unit;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, reason: impl ToString) -> PredictorError {
        PredictorError::model_unavailable(&self.path, reason)
    }

    fn verify_checksum(&self, bytes: &[u8]) -> Result<(), PredictorError> {
        let Some(expected) = &self.expected_sha256 else {
            return Ok(());
        };
        let actual = sha256_hex(bytes);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            return Err(self.unavailable(format!(
                "Checksum mismatch: expected {}, got {}",
                expected, actual
            )));
        }
        debug!(path = ?self.path, "Model checksum verified");
        Ok(())
    }

    /// Version label for formats that carry none: the file stem
    fn version_from_path(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string()
    }
}

impl ModelLoader for FileModelLoader {
    fn load(&self) -> Result<Box<dyn Predictor>, PredictorError> {
        let format = ModelFormat::from_path(&self.path)
            .ok_or_else(|| self.unavailable("Unsupported model file extension"))?;

        let bytes = std::fs::read(&self.path).map_err(|e| self.unavailable(e))?;
        self.verify_checksum(&bytes)?;

        let predictor: Box<dyn Predictor> = match format {
            ModelFormat::Onnx => Box::new(
                OnnxPredictor::new(&bytes, &self.version_from_path())
                    .map_err(|e| self.unavailable(format!("{:#}", e)))?
                    .with_output_unit(self.onnx_output_unit),
            ),
            ModelFormat::Linear => Box::new(
                LinearPredictor::from_json(&bytes).map_err(|e| self.unavailable(e))?,
            ),
        };

        debug!(
            path = ?self.path,
            format = %format,
            version = %predictor.metadata().version,
            "Model loaded"
        );
        Ok(predictor)
    }
}

/// Hex-encoded SHA-256 digest of a model artifact
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const LINEAR_MODEL: &str = r#"{
        "version": "test-1",
        "intercept": 0.5,
        "weights": { "wake": 0.0, "estimated_sleep": 1.0, "coffee": 0.25 }
    }"#;

    fn write_model(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_load_linear_model() {
        let dir = TempDir::new().unwrap();
        let path = write_model(&dir, "sleep.json", LINEAR_MODEL.as_bytes());

        let predictor = FileModelLoader::new(&path).load().unwrap();
        assert_eq!(predictor.metadata().version, "test-1");
        assert_eq!(predictor.metadata().format, ModelFormat::Linear);

        let input = PredictionInput::new(25_200, 8.0, 2).unwrap();
        let output = predictor.predict(&input).unwrap();
        assert!((output.predicted_sleep_hours - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = FileModelLoader::new(dir.path().join("absent.json"))
            .load()
            .err()
            .unwrap();
        assert!(matches!(err, PredictorError::ModelUnavailable { .. }));
    }

    #[test]
    fn test_unknown_extension_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = write_model(&dir, "SleepCalculator.mlmodel", b"whatever");
        let err = FileModelLoader::new(&path).load().err().unwrap();
        assert!(matches!(err, PredictorError::ModelUnavailable { .. }));
    }

    #[test]
    fn test_corrupt_onnx_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let path = write_model(&dir, "sleep.onnx", b"\x00\x01\x02not-an-onnx-graph");
        let err = FileModelLoader::new(&path).load().err().unwrap();
        assert!(matches!(err, PredictorError::ModelUnavailable { .. }));
    }

    #[test]
    fn test_checksum_verified() {
        let dir = TempDir::new().unwrap();
        let path = write_model(&dir, "sleep.json", LINEAR_MODEL.as_bytes());
        let digest = sha256_hex(LINEAR_MODEL.as_bytes());

        assert!(FileModelLoader::new(&path)
            .with_checksum(digest.to_uppercase())
            .load()
            .is_ok());

        let err = FileModelLoader::new(&path)
            .with_checksum("00".repeat(32))
            .load()
            .err()
            .unwrap();
        match err {
            PredictorError::ModelUnavailable { reason, .. } => {
                assert!(reason.contains("Checksum mismatch"), "reason was {}", reason)
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
