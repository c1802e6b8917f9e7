//! Fixed-fleet estimation across a whole catalog
//!
//! Where the recommender searches for a fleet size, the estimator takes one
//! as given and reports how every model behaves on every GPU at that size.

use crate::catalog::{Catalog, GpuSpec, ModelSpec};
use crate::metric::Metric;
use crate::perf_model::{self, LatencyProfile};
use crate::precision::Precision;
use gpuplan_shared::{GpuplanError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Workload evaluated at a fixed fleet size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub fleet_size: u32,
    pub prompt_tokens: u32,
    pub response_tokens: u32,
    pub concurrency: u32,
    pub precision: Precision,
}

impl Default for EstimateRequest {
    fn default() -> Self {
        Self {
            fleet_size: 1,
            prompt_tokens: 4096,
            response_tokens: 256,
            concurrency: 10,
            precision: Precision::Fp16,
        }
    }
}

impl EstimateRequest {
    pub fn validate(&self) -> Result<()> {
        if self.fleet_size == 0 {
            return Err(GpuplanError::invalid_target("fleet_size must be at least 1"));
        }
        if self.response_tokens == 0 {
            return Err(GpuplanError::invalid_target(
                "response_tokens must be at least 1",
            ));
        }
        if self.concurrency == 0 {
            return Err(GpuplanError::invalid_target("concurrency must be at least 1"));
        }
        Ok(())
    }

    pub fn context_window(&self) -> u64 {
        self.prompt_tokens as u64 + self.response_tokens as u64
    }
}

/// Memory needs of one model, independent of the GPU
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryFootprint {
    pub model_name: String,
    pub kv_cache_gib_per_token: f64,
    pub footprint_gb: f64,
}

/// A (model, GPU) pair whose footprint does not fit the fleet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OomWarning {
    pub model_name: String,
    pub gpu_name: String,
    pub footprint_gb: f64,
    pub available_gb: f64,
    /// Largest concurrency the fleet can hold at this context window
    pub max_concurrency: u64,
}

/// Whether the KV cache of every concurrent request fits next to the weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemoryStatus {
    Fits,
    #[serde(rename = "OOM")]
    Oom,
}

impl MemoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryStatus::Fits => "Fits",
            MemoryStatus::Oom => "OOM",
        }
    }
}

/// Performance of one model on one GPU type at the requested fleet size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub model_name: String,
    pub gpu_name: String,
    pub memory_status: MemoryStatus,
    pub max_kv_cache_tokens: u64,
    pub prefill_ms: Metric,
    pub tpot_ms: Metric,
    pub ttft_s: Metric,
    pub e2e_latency_s: Metric,
    /// Output tokens per second of a single request
    pub throughput_tps: Metric,
}

/// Full estimator output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateReport {
    pub request: EstimateRequest,
    pub bytes_per_param: u32,
    pub footprints: Vec<MemoryFootprint>,
    pub oom_warnings: Vec<OomWarning>,
    /// False when no GPU in the catalog has compute for the precision
    pub precision_supported: bool,
    pub performance: Vec<PerformanceRow>,
}

/// Evaluates a catalog at a fixed fleet size
#[derive(Debug, Clone, Copy, Default)]
pub struct Estimator;

impl Estimator {
    pub fn estimate(&self, catalog: &Catalog, request: &EstimateRequest) -> Result<EstimateReport> {
        request.validate()?;
        info!(
            fleet_size = request.fleet_size,
            concurrency = request.concurrency,
            precision = %request.precision,
            "Estimating catalog performance"
        );

        let bytes_per_param = request.precision.bytes_per_param();
        let context_window = request.context_window();
        let concurrency = request.concurrency as u64;

        let footprints: Vec<MemoryFootprint> = catalog
            .models
            .iter()
            .map(|model| MemoryFootprint {
                model_name: model.name.clone(),
                kv_cache_gib_per_token: perf_model::kv_cache_gib_per_token(
                    model.n_layers,
                    model.d_model,
                    bytes_per_param,
                ),
                footprint_gb: perf_model::memory_footprint_gb(
                    model,
                    concurrency,
                    context_window,
                    bytes_per_param,
                ),
            })
            .collect();

        let mut oom_warnings = Vec::new();
        for (model, footprint) in catalog.models.iter().zip(&footprints) {
            for gpu in &catalog.gpus {
                if let Some(warning) = oom_warning(request, model, gpu, footprint) {
                    debug!(
                        model = %warning.model_name,
                        gpu = %warning.gpu_name,
                        max_concurrency = warning.max_concurrency,
                        "Footprint exceeds fleet memory"
                    );
                    oom_warnings.push(warning);
                }
            }
        }

        let supported: Vec<&GpuSpec> = catalog.gpus_supporting(request.precision).collect();
        let performance = catalog
            .models
            .iter()
            .flat_map(|model| {
                supported
                    .iter()
                    .map(move |gpu| performance_row(request, model, gpu))
            })
            .collect();

        Ok(EstimateReport {
            request: request.clone(),
            bytes_per_param,
            footprints,
            oom_warnings,
            precision_supported: !supported.is_empty(),
            performance,
        })
    }
}

fn oom_warning(
    request: &EstimateRequest,
    model: &ModelSpec,
    gpu: &GpuSpec,
    footprint: &MemoryFootprint,
) -> Option<OomWarning> {
    let available_gb = request.fleet_size as f64 * gpu.memory_gb;
    if footprint.footprint_gb <= available_gb {
        return None;
    }

    let kv_tokens = perf_model::max_kv_cache_tokens(
        request.fleet_size,
        gpu.memory_gb,
        model.params_billion,
        footprint.kv_cache_gib_per_token,
        request.precision.bytes_per_param(),
    );
    Some(OomWarning {
        model_name: model.name.clone(),
        gpu_name: gpu.name.clone(),
        footprint_gb: footprint.footprint_gb,
        available_gb,
        max_concurrency: (kv_tokens / request.context_window() as f64).floor() as u64,
    })
}

fn performance_row(request: &EstimateRequest, model: &ModelSpec, gpu: &GpuSpec) -> PerformanceRow {
    let bytes_per_param = request.precision.bytes_per_param();
    let kv_per_token =
        perf_model::kv_cache_gib_per_token(model.n_layers, model.d_model, bytes_per_param);
    let kv_tokens = perf_model::max_kv_cache_tokens(
        request.fleet_size,
        gpu.memory_gb,
        model.params_billion,
        kv_per_token,
        bytes_per_param,
    );

    let needed = (request.context_window() * request.concurrency as u64) as f64;
    let memory_status = if kv_tokens >= needed {
        MemoryStatus::Fits
    } else {
        MemoryStatus::Oom
    };

    let profile = LatencyProfile::compute(
        request.fleet_size,
        model.params_billion,
        gpu.compute_for(request.precision),
        gpu.memory_bandwidth_gbps,
        request.prompt_tokens,
        request.response_tokens,
    );

    PerformanceRow {
        model_name: model.name.clone(),
        gpu_name: gpu.name.clone(),
        memory_status,
        max_kv_cache_tokens: kv_tokens as u64,
        prefill_ms: profile.prefill_ms,
        tpot_ms: profile.tpot_ms,
        ttft_s: profile.ttft_s,
        e2e_latency_s: profile.e2e_latency_s,
        throughput_tps: perf_model::throughput(request.response_tokens, profile.e2e_latency_s, 1),
    }
}
