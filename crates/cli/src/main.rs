//! BetterRest CLI
//!
//! Predicts the ideal bedtime from a wake-up time, a sleep goal and the
//! daily coffee intake using a pre-trained sleep model.

mod config;
mod output;

use anyhow::{Context, Result};
use bedtime_lib::predictor::{FileModelLoader, TimeStyle};
use bedtime_lib::{
    parse_wake_time, BedtimeCalculator, DisplayResult, PredictionInput, StructuredLogger,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// BetterRest bedtime predictor
#[derive(Parser)]
#[command(name = "betterrest")]
#[command(author, version, about = "BetterRest bedtime predictor", long_about = None)]
pub struct Cli {
    /// Model file, .onnx or linear .json (overrides the config file)
    #[arg(long, env = "BETTERREST_MODEL_PATH")]
    pub model: Option<PathBuf>,

    /// Config file (defaults to <config dir>/betterrest/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Bedtime style: 24h or 12h (overrides the config file)
    #[arg(long)]
    pub time_style: Option<TimeStyle>,

    /// Log as JSON instead of plain text
    #[arg(long)]
    pub log_json: bool,

    /// Print Prometheus metrics to stderr after the command
    #[arg(long)]
    pub emit_metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calculate the ideal bedtime
    Bedtime {
        /// Wake-up time (HH:MM)
        #[arg(long, short)]
        wake: Option<String>,

        /// Desired amount of sleep in hours (1-12)
        #[arg(long, short)]
        sleep: Option<f64>,

        /// Daily coffee intake in cups (0-20)
        #[arg(long, short)]
        coffee: Option<u32>,
    },

    /// Show the configured sleep model
    Model,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = config::CliConfig::load(cli.config.as_deref())?;
    debug!(?config, "Configuration loaded");

    let model_path = cli.model.clone().unwrap_or_else(|| config.model_path.clone());
    let mut loader = FileModelLoader::new(model_path).with_output_unit(config.model_output_unit);
    if let Some(sha) = &config.model_sha256 {
        loader = loader.with_checksum(sha.clone());
    }

    let calculator = BedtimeCalculator::new(loader)
        .with_style(cli.time_style.unwrap_or(config.time_style))
        .with_logger(StructuredLogger::new("cli"));

    let code = match cli.command {
        Commands::Bedtime {
            wake,
            sleep,
            coffee,
        } => {
            let wake = wake.unwrap_or_else(|| config.default_wake_time.clone());
            let wake = parse_wake_time(&wake)?;
            let input = PredictionInput::from_wake_time(
                wake,
                sleep.unwrap_or(config.default_sleep_hours),
                coffee.unwrap_or(config.default_coffee_cups),
            )
            .context("Invalid bedtime inputs")?;

            let display = calculator.calculate(&input);
            output::print_bedtime(&input, &display, cli.format);
            exit_code(&display)
        }
        Commands::Model => {
            let path = calculator.loader().path().display().to_string();
            let metadata = calculator
                .model_metadata()
                .with_context(|| format!("Failed to load model {}", path))?;
            output::print_model(&metadata, &path, cli.format);
            ExitCode::SUCCESS
        }
    };

    if cli.emit_metrics {
        eprint!("{}", calculator.metrics().render());
    }

    Ok(code)
}

fn exit_code(display: &DisplayResult) -> ExitCode {
    if display.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
