//! Fleet sizing for one GPU type and one model
//!
//! The planner derives two independent fleet-size requirements and keeps the
//! larger one:
//!
//! - **compute-bound**: the smallest fleet whose latency contribution fits the
//!   budget, found by a linear search bounded by the configured ceiling
//! - **memory-bound**: weights plus the aggregate KV cache divided by the
//!   memory of one GPU
//!
//! All metrics are then recomputed at the chosen fleet size and checked
//! against the target.

use crate::catalog::{GpuSpec, ModelSpec};
use crate::config::{ComputeSearchPolicy, PlannerConfig};
use crate::cost_analysis::FleetCost;
use crate::metric::Metric;
use crate::perf_model::{self, LatencyProfile};
use crate::precision::Precision;
use crate::target::PerformanceTarget;
use gpuplan_shared::{GpuplanError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which requirement determined the chosen fleet size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingConstraint {
    Compute,
    Memory,
    Both,
}

impl BindingConstraint {
    fn of(compute_fleet: u32, memory_fleet: u32) -> Self {
        use std::cmp::Ordering;
        match compute_fleet.cmp(&memory_fleet) {
            Ordering::Greater => BindingConstraint::Compute,
            Ordering::Less => BindingConstraint::Memory,
            Ordering::Equal => BindingConstraint::Both,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BindingConstraint::Compute => "compute",
            BindingConstraint::Memory => "memory",
            BindingConstraint::Both => "both",
        }
    }
}

/// Memory needed by a model and target, independent of the GPU
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryRequirements {
    pub kv_cache_gib_per_token: f64,
    /// KV cache of one request over its full context window
    pub memory_per_request_gb: f64,
    pub model_weights_gb: f64,
    pub total_memory_gb: f64,
}

impl MemoryRequirements {
    pub fn for_target(model: &ModelSpec, target: &PerformanceTarget) -> Self {
        let bytes_per_param = target.precision.bytes_per_param();
        let kv_cache_gib_per_token =
            perf_model::kv_cache_gib_per_token(model.n_layers, model.d_model, bytes_per_param);
        let memory_per_request_gb = kv_cache_gib_per_token * target.context_window() as f64;
        let model_weights_gb = perf_model::model_weights_gb(model.params_billion, bytes_per_param);
        Self {
            kv_cache_gib_per_token,
            memory_per_request_gb,
            model_weights_gb,
            total_memory_gb: perf_model::memory_footprint_gb(
                model,
                target.concurrency(),
                target.context_window(),
                bytes_per_param,
            ),
        }
    }

    /// KV cache across `concurrency` requests
    pub fn kv_cache_gb(&self, concurrency: u64) -> f64 {
        self.memory_per_request_gb * concurrency as f64
    }
}

/// Sizing outcome for one (GPU, model, target) triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub gpu_name: String,
    /// Position of the GPU in its catalog, the final ranking tie-breaker
    pub catalog_index: usize,
    pub model_name: String,
    pub precision: Precision,
    pub fleet_size: u32,
    pub compute_fleet_size: u32,
    /// False when the compute search reached the ceiling without meeting the budget
    pub compute_bound_met: bool,
    pub memory_fleet_size: u32,
    pub binding: BindingConstraint,
    pub concurrency: u64,
    pub context_window: u64,
    /// KV cache for every concurrent request, in GB
    pub kv_cache_gb: f64,
    /// Weights plus KV cache, in GB
    pub total_memory_gb: f64,
    pub prefill_ms: Metric,
    pub tpot_ms: Metric,
    pub ttft_s: Metric,
    pub e2e_latency_s: Metric,
    pub throughput_tps: Metric,
    pub within_ceiling: bool,
    pub meets_target: bool,
    #[serde(flatten)]
    pub cost: FleetCost,
}

impl PlanResult {
    pub fn is_feasible(&self) -> bool {
        self.meets_target
    }
}

/// Sizes fleets with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct CapacityPlanner {
    config: PlannerConfig,
}

impl CapacityPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans `model` on `gpu`
    ///
    /// Returns [`GpuplanError::UnsupportedPrecision`] when the GPU has no
    /// compute throughput for the target's precision.
    pub fn plan(
        &self,
        gpu: &GpuSpec,
        model: &ModelSpec,
        target: &PerformanceTarget,
    ) -> Result<PlanResult> {
        self.plan_at(0, gpu, model, target)
    }

    /// Plans `model` on the GPU found at `catalog_index`
    pub fn plan_at(
        &self,
        catalog_index: usize,
        gpu: &GpuSpec,
        model: &ModelSpec,
        target: &PerformanceTarget,
    ) -> Result<PlanResult> {
        target.validate()?;

        let precision = target.precision;
        let compute = gpu
            .compute_for(precision)
            .ok_or_else(|| GpuplanError::unsupported_precision(&gpu.name, precision.as_str()))?;

        let context_window = target.context_window();
        if context_window > model.max_context_window as u64 {
            warn!(
                model = %model.name,
                context_window,
                max_context_window = model.max_context_window,
                "Requested context exceeds the model's context window"
            );
        }

        let concurrency = target.concurrency();
        let memory = MemoryRequirements::for_target(model, target);
        let kv_cache_gb = memory.kv_cache_gb(concurrency);
        let total_memory_gb = memory.total_memory_gb;

        let (compute_fleet_size, compute_bound_met) =
            self.compute_bound_fleet(gpu, model, target, compute);
        if !compute_bound_met {
            warn!(
                gpu = %gpu.name,
                model = %model.name,
                ceiling = self.config.fleet_ceiling,
                "Latency budget not met within the fleet ceiling"
            );
        }

        let memory_fleet_size = memory_bound_fleet(total_memory_gb, gpu.memory_gb);
        let fleet_size = compute_fleet_size.max(memory_fleet_size);
        let binding = BindingConstraint::of(compute_fleet_size, memory_fleet_size);

        let profile = LatencyProfile::compute(
            fleet_size,
            model.params_billion,
            Some(compute),
            gpu.memory_bandwidth_gbps,
            target.prompt_tokens,
            target.response_tokens,
        );
        let throughput_tps =
            perf_model::throughput(target.response_tokens, profile.e2e_latency_s, concurrency);

        let within_ceiling = fleet_size <= self.config.fleet_ceiling;
        let meets_target = within_ceiling
            && profile
                .e2e_latency_s
                .satisfies(|latency| latency <= target.max_latency)
            && throughput_tps.satisfies(|tps| tps >= target.token_rate);

        debug!(
            gpu = %gpu.name,
            model = %model.name,
            fleet_size,
            compute_fleet_size,
            memory_fleet_size,
            binding = binding.as_str(),
            meets_target,
            "Planned fleet"
        );

        Ok(PlanResult {
            gpu_name: gpu.name.clone(),
            catalog_index,
            model_name: model.name.clone(),
            precision,
            fleet_size,
            compute_fleet_size,
            compute_bound_met,
            memory_fleet_size,
            binding,
            concurrency,
            context_window,
            kv_cache_gb,
            total_memory_gb,
            prefill_ms: profile.prefill_ms,
            tpot_ms: profile.tpot_ms,
            ttft_s: profile.ttft_s,
            e2e_latency_s: profile.e2e_latency_s,
            throughput_tps,
            within_ceiling,
            meets_target,
            cost: FleetCost::for_fleet(gpu, fleet_size, self.config.days_per_month),
        })
    }

    /// Smallest fleet whose latency contribution fits the budget
    ///
    /// Yields `(ceiling, false)` when no fleet up to the ceiling does.
    fn compute_bound_fleet(
        &self,
        gpu: &GpuSpec,
        model: &ModelSpec,
        target: &PerformanceTarget,
        compute: f64,
    ) -> (u32, bool) {
        let ceiling = self.config.fleet_ceiling;
        for fleet_size in 1..=ceiling {
            let latency = self.search_latency(fleet_size, gpu, model, target, compute);
            if latency.satisfies(|l| l <= target.max_latency) {
                return (fleet_size, true);
            }
        }
        (ceiling, false)
    }

    fn search_latency(
        &self,
        fleet_size: u32,
        gpu: &GpuSpec,
        model: &ModelSpec,
        target: &PerformanceTarget,
        compute: f64,
    ) -> Metric {
        match self.config.compute_search {
            ComputeSearchPolicy::PrefillOnly => {
                match perf_model::prefill_time_per_token(
                    fleet_size,
                    model.params_billion,
                    Some(compute),
                ) {
                    Metric::Value(prefill) => {
                        Metric::checked(prefill * target.prompt_tokens as f64 / 1000.0)
                    }
                    _ => Metric::NotComputable,
                }
            }
            ComputeSearchPolicy::EndToEnd => {
                LatencyProfile::compute(
                    fleet_size,
                    model.params_billion,
                    Some(compute),
                    gpu.memory_bandwidth_gbps,
                    target.prompt_tokens,
                    target.response_tokens,
                )
                .e2e_latency_s
            }
        }
    }
}

/// GPUs needed to hold `total_memory_gb`, at least one
fn memory_bound_fleet(total_memory_gb: f64, gpu_memory_gb: f64) -> u32 {
    let fleet = (total_memory_gb / gpu_memory_gb).ceil();
    if fleet.is_nan() || fleet < 1.0 {
        1
    } else {
        // Saturating cast; anything this large is far past any ceiling
        fleet as u32
    }
}
