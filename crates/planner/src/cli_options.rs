//! CLI options for the gpuplan commands
//!
//! This module defines the command-line options of the planning, estimation
//! and catalog commands. Each struct can be parsed standalone or embedded in
//! the unified `gpuplan` binary as a subcommand.

use crate::catalog::Catalog;
use crate::config::{ComputeSearchPolicy, PlannerConfig};
use crate::estimator::{EstimateRequest, Estimator};
use crate::loader::CatalogSource;
use crate::precision::Precision;
use crate::recommender::Recommender;
use crate::report;
use crate::target::PerformanceTarget;
use clap::{Args, Parser, ValueEnum};
use gpuplan_shared::cli::parse_string_list;
use gpuplan_shared::{LoggingOptions, OutputFormat, OutputOptions, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Catalog file options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogOptions {
    /// TSV file replacing the built-in GPU list
    #[arg(long, env = "GPUPLAN_GPU_FILE")]
    pub gpu_file: Option<PathBuf>,

    /// TSV file replacing the built-in model list
    #[arg(long, env = "GPUPLAN_MODEL_FILE")]
    pub model_file: Option<PathBuf>,

    /// JSON catalog with `gpus` and `models` arrays replacing the built-in catalog
    #[arg(long, env = "GPUPLAN_CATALOG_JSON")]
    pub catalog_json: Option<PathBuf>,
}

impl CatalogOptions {
    pub fn source(&self) -> CatalogSource {
        CatalogSource {
            catalog_json: self.catalog_json.clone(),
            gpu_file: self.gpu_file.clone(),
            model_file: self.model_file.clone(),
        }
    }

    pub fn load(&self) -> Result<Catalog> {
        self.source().load()
    }
}

/// Find the smallest GPU fleet meeting a token-rate and latency target
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct PlanCliOptions {
    /// Model name as listed in the catalog (case-insensitive)
    #[arg(short, long, env = "GPUPLAN_MODEL")]
    pub model: String,

    /// Target output token rate in tokens per second
    #[arg(short = 't', long, env = "GPUPLAN_TOKEN_RATE")]
    pub token_rate: f64,

    /// Maximum acceptable end-to-end latency in seconds
    #[arg(short = 'l', long, env = "GPUPLAN_MAX_LATENCY")]
    pub max_latency: f64,

    /// Prompt size in tokens
    #[arg(short, long, default_value_t = 4096, env = "GPUPLAN_PROMPT_TOKENS")]
    pub prompt_tokens: u32,

    /// Response size in tokens
    #[arg(short, long, default_value_t = 256, env = "GPUPLAN_RESPONSE_TOKENS")]
    pub response_tokens: u32,

    /// Numeric precision for weights and compute
    #[arg(
        short = 'w',
        long,
        value_enum,
        default_value_t = Precision::Fp16,
        env = "GPUPLAN_PRECISION"
    )]
    pub precision: Precision,

    /// Concurrent requests; derived from the token rate when omitted
    #[arg(short = 'c', long, env = "GPUPLAN_MAX_CONCURRENT")]
    pub max_concurrent: Option<u32>,

    /// Largest fleet the compute-bound search will try [default: 128]
    ///
    /// Overrides `GPUPLAN_FLEET_CEILING`.
    #[arg(long)]
    pub fleet_ceiling: Option<u32>,

    /// Latency the compute-bound search holds against the budget [default: prefill-only]
    ///
    /// Overrides `GPUPLAN_COMPUTE_SEARCH`.
    #[arg(long, value_enum)]
    pub compute_search: Option<ComputeSearchPolicy>,

    /// Billing days per month for operating cost [default: 30]
    ///
    /// Overrides `GPUPLAN_DAYS_PER_MONTH`.
    #[arg(long)]
    pub days_per_month: Option<u32>,

    /// Restrict planning to these GPUs (comma-separated catalog names)
    #[arg(long, env = "GPUPLAN_ONLY_GPUS")]
    pub only_gpus: Option<String>,

    /// Plan GPU types one after another instead of on a thread pool
    ///
    /// Overrides `GPUPLAN_PARALLEL`.
    #[arg(long)]
    pub sequential: bool,

    #[command(flatten)]
    pub catalog: CatalogOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub logging: LoggingOptions,
}

impl PlanCliOptions {
    /// Run the planner and print the report to stdout
    pub fn run(&self) -> Result<()> {
        let rendered = self.render()?;
        write!(std::io::stdout().lock(), "{}", rendered)?;
        Ok(())
    }

    /// Run the planner and return the rendered report
    pub fn render(&self) -> Result<String> {
        let config = self.to_config()?;
        let target = self.to_target()?;
        let mut catalog = self.catalog.load()?;
        if let Some(only) = &self.only_gpus {
            catalog.retain_gpus(&parse_string_list(only))?;
        }

        info!(
            model = %self.model,
            token_rate = self.token_rate,
            max_latency = self.max_latency,
            "Starting capacity plan"
        );
        let recommendation = Recommender::new(config).recommend_for(&catalog, &self.model, &target)?;

        match self.output.format {
            OutputFormat::Table => Ok(report::render_recommendation(&recommendation)),
            OutputFormat::Json => Ok(report::to_json(&recommendation)? + "\n"),
        }
    }

    pub fn to_target(&self) -> Result<PerformanceTarget> {
        let target = PerformanceTarget::new(
            self.token_rate,
            self.max_latency,
            self.prompt_tokens,
            self.response_tokens,
            self.precision,
        )?;
        match self.max_concurrent {
            Some(n) => target.with_max_concurrent(n),
            None => Ok(target),
        }
    }

    /// Convert CLI options to PlannerConfig
    ///
    /// Starts from [`PlannerConfig::from_env`]; flags given on the command
    /// line take precedence over the environment.
    pub fn to_config(&self) -> Result<PlannerConfig> {
        let mut config = PlannerConfig::from_env()?;
        if let Some(fleet_ceiling) = self.fleet_ceiling {
            config.fleet_ceiling = fleet_ceiling;
        }
        if let Some(compute_search) = self.compute_search {
            config.compute_search = compute_search;
        }
        if let Some(days_per_month) = self.days_per_month {
            config.days_per_month = days_per_month;
        }
        if self.sequential {
            config.parallel = false;
        }
        PlannerConfig::new(config)
    }
}

/// Estimate memory and latency of every model on every GPU at a fixed fleet size
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct EstimateCliOptions {
    /// Number of GPUs in the fleet
    #[arg(short = 'g', long, default_value_t = 1, env = "GPUPLAN_FLEET_SIZE")]
    pub fleet_size: u32,

    /// Prompt size in tokens
    #[arg(short, long, default_value_t = 4096, env = "GPUPLAN_PROMPT_TOKENS")]
    pub prompt_tokens: u32,

    /// Response size in tokens
    #[arg(short, long, default_value_t = 256, env = "GPUPLAN_RESPONSE_TOKENS")]
    pub response_tokens: u32,

    /// Number of concurrent requests
    #[arg(short = 'c', long, default_value_t = 10, env = "GPUPLAN_CONCURRENCY")]
    pub concurrency: u32,

    /// Numeric precision for weights and compute
    #[arg(
        short = 'w',
        long,
        value_enum,
        default_value_t = Precision::Fp16,
        env = "GPUPLAN_PRECISION"
    )]
    pub precision: Precision,

    #[command(flatten)]
    pub catalog: CatalogOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub logging: LoggingOptions,
}

impl EstimateCliOptions {
    pub fn run(&self) -> Result<()> {
        let rendered = self.render()?;
        write!(std::io::stdout().lock(), "{}", rendered)?;
        Ok(())
    }

    pub fn render(&self) -> Result<String> {
        let catalog = self.catalog.load()?;
        let report = Estimator.estimate(&catalog, &self.to_request())?;

        match self.output.format {
            OutputFormat::Table => Ok(report::render_estimate(&report)),
            OutputFormat::Json => Ok(report::to_json(&report)? + "\n"),
        }
    }

    pub fn to_request(&self) -> EstimateRequest {
        EstimateRequest {
            fleet_size: self.fleet_size,
            prompt_tokens: self.prompt_tokens,
            response_tokens: self.response_tokens,
            concurrency: self.concurrency,
            precision: self.precision,
        }
    }
}

/// Catalog section to list
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogView {
    Gpus,
    Models,
    #[default]
    All,
}

/// List the GPUs and models in the active catalog
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CatalogCliOptions {
    /// Section to list
    #[arg(value_enum, default_value = "all")]
    pub view: CatalogView,

    #[command(flatten)]
    pub catalog: CatalogOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub logging: LoggingOptions,
}

impl CatalogCliOptions {
    pub fn run(&self) -> Result<()> {
        let rendered = self.render()?;
        write!(std::io::stdout().lock(), "{}", rendered)?;
        Ok(())
    }

    pub fn render(&self) -> Result<String> {
        let catalog = self.catalog.load()?;

        if self.output.format == OutputFormat::Json {
            let json = match self.view {
                CatalogView::Gpus => report::to_json(&catalog.gpus)?,
                CatalogView::Models => report::to_json(&catalog.models)?,
                CatalogView::All => report::to_json(&catalog)?,
            };
            return Ok(json + "\n");
        }

        let mut out = String::new();
        if matches!(self.view, CatalogView::Gpus | CatalogView::All) {
            out.push_str(&report::gpu_table(&catalog).render());
        }
        if self.view == CatalogView::All {
            out.push('\n');
        }
        if matches!(self.view, CatalogView::Models | CatalogView::All) {
            out.push_str(&report::model_table(&catalog).render());
        }
        Ok(out)
    }
}
