//! Flood Risk Service - command line entry point
//!
//! Resolves a place name, pulls the official regional status and hourly
//! precipitation telemetry, and prints the flood risk assessment as JSON.
//! With `--endpoint` it serves the same analysis over HTTP instead.
//!
//! Usage:
//!   cargo run --release -- "Jakarta Selatan"      # One-shot analysis
//!   cargo run --release -- --endpoint 8080        # Serve /analyze on port 8080
//!   cargo run --release -- Bandung --seed 42      # Reproducible correction values
//!
//! Environment:
//!   FLORISK_CONFIG     - path to the TOML configuration (default florisk.toml)
//!   GEMINI_API_KEY     - enables the Gemini narrative provider
//!   RUST_LOG           - log filter (default info)
//!   FLORISK_LOG_FORMAT - "json" for structured log lines

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use florisk_service::config::{self, EngineConfig};
use florisk_service::endpoint;
use florisk_service::logging;
use florisk_service::pipeline::FloodAnalyzer;

#[derive(Parser, Debug)]
#[command(name = "florisk_service")]
#[command(about = "Hybrid flood risk inference from official status and rainfall telemetry")]
#[command(version)]
struct CliArgs {
    /// Place name to analyze, e.g. "Jakarta Selatan"
    location: Option<String>,

    /// Serve the HTTP API on this port instead of running one analysis
    #[arg(long, value_name = "PORT")]
    endpoint: Option<u16>,

    /// Worker threads for the HTTP API
    #[arg(long, default_value = "4")]
    workers: usize,

    /// Fixed seed for the rainfall correction RNG
    #[arg(long)]
    seed: Option<u64>,

    /// Configuration file (overrides FLORISK_CONFIG)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn load(args: &CliArgs) -> Result<EngineConfig, String> {
    let mut config = match &args.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .map_err(|e| e.to_string())?;

    if args.seed.is_some() {
        config.correction.seed = args.seed;
    }
    Ok(config)
}

fn main() -> ExitCode {
    logging::init_logging();
    let args = CliArgs::parse();

    let config = match load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration error");
            return ExitCode::FAILURE;
        }
    };

    let analyzer = match FloodAnalyzer::from_config(config) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            error!(error = %e, "Could not build HTTP clients");
            return ExitCode::FAILURE;
        }
    };

    if let Some(port) = args.endpoint {
        return match endpoint::start_endpoint_server(port, Arc::new(analyzer), args.workers) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %e, "Endpoint stopped");
                ExitCode::FAILURE
            }
        };
    }

    let Some(location) = args.location.as_deref() else {
        eprintln!("Usage: florisk_service <LOCATION> | --endpoint <PORT>");
        return ExitCode::from(2);
    };

    match analyzer.analyze(location) {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "Could not serialize result");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!(error = %e, "Analysis failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
