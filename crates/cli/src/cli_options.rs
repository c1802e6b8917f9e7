//! CLI options for the unified gpuplan command-line interface
//!
//! This module organizes the command options defined by the planner crate
//! into one binary.

use clap::{Parser, Subcommand};
use gpuplan_planner::{CatalogCliOptions, EstimateCliOptions, PlanCliOptions};
use gpuplan_shared::{LoggingOptions, Result};

/// gpuplan - Capacity planner for serving large language models on GPU fleets
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available gpuplan commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the smallest GPU fleet meeting a token-rate and latency target
    Plan(PlanCliOptions),

    /// Estimate memory and latency of every model on every GPU at a fixed fleet size
    Estimate(EstimateCliOptions),

    /// List the GPUs and models in the active catalog
    Catalog(CatalogCliOptions),
}

impl Cli {
    /// Logging options of the selected command
    pub fn logging(&self) -> &LoggingOptions {
        match &self.command {
            Commands::Plan(opts) => &opts.logging,
            Commands::Estimate(opts) => &opts.logging,
            Commands::Catalog(opts) => &opts.logging,
        }
    }

    /// Run the selected command
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Plan(opts) => opts.run(),
            Commands::Estimate(opts) => opts.run(),
            Commands::Catalog(opts) => opts.run(),
        }
    }

    /// Run the selected command and return its report instead of printing it
    pub fn render(&self) -> Result<String> {
        match &self.command {
            Commands::Plan(opts) => opts.render(),
            Commands::Estimate(opts) => opts.render(),
            Commands::Catalog(opts) => opts.render(),
        }
    }
}
