//! Output formatting utilities

use bedtime_lib::predictor::{coffee_label, sleep_label};
use bedtime_lib::{DisplayResult, ModelMetadata, PredictionInput, FEATURE_NAMES};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

#[derive(Tabled, Serialize)]
struct InputRow {
    #[tabled(rename = "Wake up")]
    wake_up: String,
    #[tabled(rename = "Desired sleep")]
    sleep: String,
    #[tabled(rename = "Coffee")]
    coffee: String,
}

#[derive(Serialize)]
struct BedtimeReport<'a> {
    wake_seconds: u32,
    sleep_hours: f64,
    coffee_cups: u32,
    title: &'a str,
    message: &'a str,
}

/// Print the inputs and the calculated bedtime (or the error result)
pub fn print_bedtime(input: &PredictionInput, display: &DisplayResult, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let row = InputRow {
                wake_up: input.wake_time().format("%H:%M").to_string(),
                sleep: sleep_label(input.sleep_hours()),
                coffee: coffee_label(input.coffee_cups()),
            };
            let table = Table::new([row]).with(Style::rounded()).to_string();
            println!("{}", table);
            println!();
            if display.is_error() {
                print_error(&display.title);
                eprintln!("  {}", display.message);
            } else {
                println!("{}", display.title.bold());
                println!("  ☀️   {}   🌘", display.message.green().bold());
            }
        }
        OutputFormat::Json => {
            let report = BedtimeReport {
                wake_seconds: input.wake_seconds(),
                sleep_hours: input.sleep_hours(),
                coffee_cups: input.coffee_cups(),
                title: &display.title,
                message: &display.message,
            };
            print_json(&report);
        }
    }
}

#[derive(Tabled, Serialize)]
struct ModelRow {
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Format")]
    format: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Features")]
    features: String,
}

/// Print loaded model details
pub fn print_model(metadata: &ModelMetadata, path: &str, format: OutputFormat) {
    let row = ModelRow {
        version: metadata.version.clone(),
        format: metadata.format.to_string(),
        path: path.to_string(),
        features: FEATURE_NAMES.join(", "),
    };
    match format {
        OutputFormat::Table => {
            let table = Table::new([row]).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => print_json(&row),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to serialize output: {}", e)),
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}
