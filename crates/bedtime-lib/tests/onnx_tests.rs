//! ONNX model tests
//!
//! Small `Gemm` regression graphs are encoded in memory, written to disk
//! and run through `FileModelLoader` and `BedtimeCalculator`.

use bedtime_lib::predictor::{sha256_hex, FileModelLoader, ModelLoader, TimeStyle};
use bedtime_lib::{BedtimeCalculator, ModelFormat, OutputUnit, PredictionInput};
use chrono::NaiveTime;
use prost::Message;
use std::path::PathBuf;
use tempfile::TempDir;
use tract_onnx::pb::{self, attribute_proto::AttributeType, tensor_proto::DataType};

fn tensor_info(name: &str, elem_type: DataType, shape: &[i64]) -> pb::ValueInfoProto {
    let dim = shape
        .iter()
        .map(|&d| pb::tensor_shape_proto::Dimension {
            value: Some(pb::tensor_shape_proto::dimension::Value::DimValue(d)),
            ..Default::default()
        })
        .collect();
    pb::ValueInfoProto {
        name: name.to_string(),
        r#type: Some(pb::TypeProto {
            value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                elem_type: elem_type as i32,
                shape: Some(pb::TensorShapeProto { dim }),
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn float_initializer(name: &str, dims: &[i64], values: &[f32]) -> pb::TensorProto {
    pb::TensorProto {
        name: name.to_string(),
        dims: dims.to_vec(),
        data_type: DataType::Float as i32,
        float_data: values.to_vec(),
        ..Default::default()
    }
}

/// `Y = X · W + B` over `[wake, estimated_sleep, coffee]`, optionally cast
/// to another element type before it leaves the graph.
fn regression_model(intercept: f32, weights: [f32; 3], output_type: DataType) -> Vec<u8> {
    let gemm_output = if output_type == DataType::Float { "Y" } else { "Y_f32" };
    let mut node = vec![pb::NodeProto {
        name: "regression".to_string(),
        op_type: "Gemm".to_string(),
        input: vec!["X".to_string(), "W".to_string(), "B".to_string()],
        output: vec![gemm_output.to_string()],
        ..Default::default()
    }];
    if output_type != DataType::Float {
        node.push(pb::NodeProto {
            name: "cast".to_string(),
            op_type: "Cast".to_string(),
            input: vec![gemm_output.to_string()],
            output: vec!["Y".to_string()],
            attribute: vec![pb::AttributeProto {
                name: "to".to_string(),
                r#type: AttributeType::Int as i32,
                i: output_type as i64,
                ..Default::default()
            }],
            ..Default::default()
        });
    }

    let graph = pb::GraphProto {
        name: "sleep_calculator".to_string(),
        node,
        initializer: vec![
            float_initializer("W", &[3, 1], &weights),
            float_initializer("B", &[1, 1], &[intercept]),
        ],
        input: vec![tensor_info("X", DataType::Float, &[1, 3])],
        output: vec![tensor_info("Y", output_type, &[1, 1])],
        ..Default::default()
    };

    pb::ModelProto {
        ir_version: 7,
        opset_import: vec![pb::OperatorSetIdProto {
            domain: String::new(),
            version: 13,
        }],
        producer_name: "bedtime-lib-tests".to_string(),
        graph: Some(graph),
        ..Default::default()
    }
    .encode_to_vec()
}

fn write_model(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn wake(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[test]
fn test_onnx_model_predicts_through_loader() {
    let dir = TempDir::new().unwrap();
    let path = write_model(
        &dir,
        "sleep_onnx.onnx",
        &regression_model(0.5, [0.0, 1.0, 0.25], DataType::Float),
    );

    let predictor = FileModelLoader::new(&path).load().unwrap();
    assert_eq!(predictor.metadata().format, ModelFormat::Onnx);
    assert_eq!(predictor.metadata().version, "sleep_onnx");

    let input = PredictionInput::new(25_200, 8.0, 2).unwrap();
    let output = predictor.predict(&input).unwrap();
    assert!((output.predicted_sleep_hours - 9.0).abs() < 1e-6);
    assert_eq!(output.model_version, "sleep_onnx");
}

#[test]
fn test_onnx_model_drives_calculator() {
    let dir = TempDir::new().unwrap();
    let path = write_model(
        &dir,
        "sleep.onnx",
        &regression_model(0.0, [0.0, 1.0, 0.0], DataType::Float),
    );

    let calculator = BedtimeCalculator::new(FileModelLoader::new(&path));
    let input = PredictionInput::from_wake_time(wake(7, 0), 8.0, 1).unwrap();
    let display = calculator.calculate(&input);
    assert!(!display.is_error(), "got {:?}", display);
    assert_eq!(display.message, "23:00");

    let twelve = BedtimeCalculator::new(FileModelLoader::new(&path))
        .with_style(TimeStyle::TwelveHour);
    assert_eq!(twelve.calculate(&input).message, "11:00 PM");
    assert_eq!(twelve.loader().path(), path.as_path());
}

#[test]
fn test_onnx_wake_feature_is_seconds_since_midnight() {
    let dir = TempDir::new().unwrap();
    let path = write_model(
        &dir,
        "sleep.onnx",
        &regression_model(0.0, [1.0 / 3600.0, 0.0, 0.0], DataType::Float),
    );

    let predictor = FileModelLoader::new(&path).load().unwrap();
    let input = PredictionInput::from_wake_time(wake(7, 0), 8.0, 1).unwrap();
    let output = predictor.predict(&input).unwrap();
    assert!((output.predicted_sleep_hours - 7.0).abs() < 1e-3);
}

#[test]
fn test_onnx_double_output_is_accepted() {
    let dir = TempDir::new().unwrap();
    let path = write_model(
        &dir,
        "sleep.onnx",
        &regression_model(0.5, [0.0, 1.0, 0.25], DataType::Double),
    );

    let calculator = BedtimeCalculator::new(FileModelLoader::new(&path));
    let input = PredictionInput::from_wake_time(wake(7, 0), 8.0, 2).unwrap();
    let bedtime = calculator.bedtime(&input).unwrap();
    assert_eq!(bedtime.format(TimeStyle::TwentyFourHour), "22:00");
}

#[test]
fn test_onnx_output_in_seconds() {
    let dir = TempDir::new().unwrap();
    let path = write_model(
        &dir,
        "sleep.onnx",
        &regression_model(0.0, [0.0, 3600.0, 0.0], DataType::Float),
    );

    let loader = FileModelLoader::new(&path).with_output_unit(OutputUnit::Seconds);
    let calculator = BedtimeCalculator::new(loader);
    let input = PredictionInput::from_wake_time(wake(7, 0), 8.0, 1).unwrap();
    let display = calculator.calculate(&input);
    assert_eq!(display.message, "23:00");
}

#[test]
fn test_onnx_checksum_verified() {
    let dir = TempDir::new().unwrap();
    let bytes = regression_model(0.0, [0.0, 1.0, 0.0], DataType::Float);
    let path = write_model(&dir, "sleep.onnx", &bytes);

    assert!(FileModelLoader::new(&path)
        .with_checksum(sha256_hex(&bytes))
        .load()
        .is_ok());
    assert!(FileModelLoader::new(&path)
        .with_checksum(sha256_hex(b"other"))
        .load()
        .is_err());
}
