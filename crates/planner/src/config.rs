//! Planner configuration management

use clap::ValueEnum;
use gpuplan_shared::{GpuplanError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Largest fleet the compute-bound search will try
pub const DEFAULT_FLEET_CEILING: u32 = 128;

/// Billing days in one month
pub const DEFAULT_DAYS_PER_MONTH: u32 = 30;

/// Latency that must fit the budget during the compute-bound search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ComputeSearchPolicy {
    /// Only the prompt's prefill time counts; TPOT is checked after sizing
    #[default]
    PrefillOnly,
    /// Prefill plus decode time must fit, so TPOT also drives the search
    EndToEnd,
}

impl FromStr for ComputeSearchPolicy {
    type Err = GpuplanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "prefill-only" => Ok(ComputeSearchPolicy::PrefillOnly),
            "end-to-end" => Ok(ComputeSearchPolicy::EndToEnd),
            other => Err(GpuplanError::configuration(
                format!(
                    "invalid compute search policy '{}' (expected prefill-only or end-to-end)",
                    other
                ),
                None,
            )),
        }
    }
}

/// Configuration for the capacity planner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannerConfig {
    /// Upper bound of the compute-bound fleet search
    pub fleet_ceiling: u32,
    /// What the compute-bound search holds against the latency budget
    pub compute_search: ComputeSearchPolicy,
    /// Days used to turn daily opex into monthly opex
    pub days_per_month: u32,
    /// Plan GPU types on the rayon pool
    pub parallel: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            fleet_ceiling: DEFAULT_FLEET_CEILING,
            compute_search: ComputeSearchPolicy::PrefillOnly,
            days_per_month: DEFAULT_DAYS_PER_MONTH,
            parallel: true,
        }
    }
}

impl PlannerConfig {
    /// Creates a validated configuration
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fleet_ceiling == 0 {
            return Err(GpuplanError::configuration(
                "fleet_ceiling must be at least 1",
                None,
            ));
        }
        if self.days_per_month == 0 || self.days_per_month > 31 {
            return Err(GpuplanError::configuration(
                format!(
                    "days_per_month must be between 1 and 31, got {}",
                    self.days_per_month
                ),
                None,
            ));
        }
        Ok(())
    }

    /// Creates configuration from environment variables, falling back to defaults
    ///
    /// # Environment Variables
    ///
    /// - `GPUPLAN_FLEET_CEILING` - Upper bound of the compute-bound search
    /// - `GPUPLAN_COMPUTE_SEARCH` - `prefill-only` or `end-to-end`
    /// - `GPUPLAN_DAYS_PER_MONTH` - Billing days per month
    /// - `GPUPLAN_PARALLEL` - Plan GPU types in parallel (`true`/`false`)
    pub fn from_env() -> Result<Self> {
        debug!("Loading planner configuration from environment variables");

        let mut config = Self::default();

        if let Ok(value) = std::env::var("GPUPLAN_FLEET_CEILING") {
            config.fleet_ceiling = value.trim().parse().map_err(|e| {
                GpuplanError::configuration(
                    format!("Invalid GPUPLAN_FLEET_CEILING: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        }

        if let Ok(value) = std::env::var("GPUPLAN_COMPUTE_SEARCH") {
            config.compute_search = value.parse()?;
        }

        if let Ok(value) = std::env::var("GPUPLAN_DAYS_PER_MONTH") {
            config.days_per_month = value.trim().parse().map_err(|e| {
                GpuplanError::configuration(
                    format!("Invalid GPUPLAN_DAYS_PER_MONTH: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        }

        if let Ok(value) = std::env::var("GPUPLAN_PARALLEL") {
            config.parallel = value.trim().parse().map_err(|e| {
                GpuplanError::configuration(
                    format!("Invalid GPUPLAN_PARALLEL: {}", e),
                    Some(Box::new(e)),
                )
            })?;
        }

        Self::new(config)
    }
}
