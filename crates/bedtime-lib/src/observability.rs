//! Observability infrastructure for bedtime prediction
//!
//! Provides:
//! - Prometheus metrics (prediction latency, prediction and failure counts, model info)
//! - Structured logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    Encoder, GaugeVec, Histogram, IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.5,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<BedtimeMetricsInner> = OnceLock::new();

struct BedtimeMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounter,
    prediction_failures_total: IntCounterVec,
    model_info: GaugeVec,
}

impl BedtimeMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "betterrest_prediction_latency_seconds",
                "Time spent loading the model and predicting a bedtime",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter!(
                "betterrest_predictions_total",
                "Total number of bedtimes predicted"
            )
            .expect("Failed to register predictions_total"),

            prediction_failures_total: register_int_counter_vec!(
                "betterrest_prediction_failures_total",
                "Total number of failed bedtime calculations by cause",
                &["kind"]
            )
            .expect("Failed to register prediction_failures_total"),

            model_info: register_gauge_vec!(
                "betterrest_model_info",
                "Information about the most recently loaded sleep model",
                &["version", "format"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Handle to the process-wide Prometheus metrics.
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct BedtimeMetrics {
    _private: (),
}

impl Default for BedtimeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl BedtimeMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(BedtimeMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &BedtimeMetricsInner {
        GLOBAL_METRICS.get_or_init(BedtimeMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions_total.inc();
    }

    /// Count a failure under its cause (`model_unavailable` or `inference`)
    pub fn inc_failures(&self, kind: &str) {
        self.inner()
            .prediction_failures_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn failures(&self, kind: &str) -> u64 {
        self.inner()
            .prediction_failures_total
            .with_label_values(&[kind])
            .get()
    }

    pub fn predictions(&self) -> u64 {
        self.inner().predictions_total.get()
    }

    pub fn set_model_info(&self, version: &str, format: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[version, format])
            .set(1.0);
    }

    /// Render every registered metric in the Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Structured logger for bedtime calculation events
#[derive(Clone)]
pub struct StructuredLogger {
    source: String,
}

impl StructuredLogger {
    /// `source` names the front end issuing calculations, e.g. `cli`
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn log_model_loaded(&self, version: &str, format: &str) {
        debug!(
            event = "model_loaded",
            source = %self.source,
            model_version = %version,
            model_format = %format,
            "Sleep model loaded"
        );
    }

    pub fn log_prediction(
        &self,
        wake_seconds: u32,
        sleep_hours: f64,
        coffee_cups: u32,
        predicted_sleep_hours: f64,
        bedtime: &str,
        model_version: &str,
    ) {
        info!(
            event = "bedtime_predicted",
            source = %self.source,
            wake_seconds = wake_seconds,
            sleep_hours = sleep_hours,
            coffee_cups = coffee_cups,
            predicted_sleep_hours = predicted_sleep_hours,
            bedtime = %bedtime,
            model_version = %model_version,
            "Predicted bedtime"
        );
    }

    pub fn log_prediction_failure(&self, kind: &str, details: &str) {
        warn!(
            event = "bedtime_failed",
            source = %self.source,
            kind = %kind,
            details = %details,
            "Bedtime calculation failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recorded() {
        let metrics = BedtimeMetrics::new();
        let before = metrics.failures("inference");

        metrics.observe_prediction_latency(0.0002);
        metrics.inc_predictions();
        metrics.inc_failures("inference");
        metrics.set_model_info("v1.0.0", "linear");

        assert!(metrics.failures("inference") >= before + 1);
        assert!(metrics.predictions() >= 1);

        let text = metrics.render();
        assert!(text.contains("betterrest_predictions_total"));
        assert!(text.contains("betterrest_model_info"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("test");
        assert_eq!(logger.source, "test");
    }
}
