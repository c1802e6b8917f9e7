//! # gpuplan CLI - Main Entry Point
//!
//! Unified command-line interface for LLM serving capacity planning.

use clap::Parser;
use gpuplan_cli::Cli;
use gpuplan_shared::{GpuplanError, Result};
use tracing::error;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Warning: {}", e);
    }

    if let Err(e) = cli.run() {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Initialize logging from the GPUPLAN_LOG filter when set, otherwise from --log-level
fn init_logging(cli: &Cli) -> Result<()> {
    match std::env::var("GPUPLAN_LOG") {
        Ok(filter) => tracing_subscriber::fmt()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| GpuplanError::configuration("Failed to set logging subscriber", Some(e))),
        Err(_) => cli.logging().init_logging(),
    }
}
