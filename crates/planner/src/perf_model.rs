//! Closed-form performance model
//!
//! Pure functions estimating memory footprint, latency and throughput of a
//! model served on a fleet of identical GPUs.
//!
//! Every time formula divides work evenly across the fleet: compute and
//! memory bandwidth are assumed to scale perfectly linearly with fleet size.
//! This is the model's contract, not a claim about real hardware.
//!
//! Units: memory in GB (GiB for the KV cache), per-token times in
//! milliseconds, request-level latencies in seconds.

use crate::catalog::ModelSpec;
use crate::metric::Metric;

/// Bytes in one GiB
pub const BYTES_PER_GIB: f64 = 1_073_741_824.0;

/// KV-cache size of one token in GiB
///
/// The factor 2 stores one key and one value vector per layer.
pub fn kv_cache_gib_per_token(n_layers: u32, d_model: u32, bytes_per_param: u32) -> f64 {
    2.0 * bytes_per_param as f64 * n_layers as f64 * d_model as f64 / BYTES_PER_GIB
}

/// Weights resident on the fleet, in GB
pub fn model_weights_gb(params_billion: f64, bytes_per_param: u32) -> f64 {
    params_billion * bytes_per_param as f64
}

/// Total memory for weights plus the aggregate KV-cache working set, in GB
pub fn memory_footprint_gb(
    model: &ModelSpec,
    concurrency: u64,
    context_window: u64,
    bytes_per_param: u32,
) -> f64 {
    let kv_per_token = kv_cache_gib_per_token(model.n_layers, model.d_model, bytes_per_param);
    kv_per_token * context_window as f64 * concurrency as f64
        + model_weights_gb(model.params_billion, bytes_per_param)
}

/// Tokens of KV cache that fit next to the weights
///
/// Clamped to zero when the weights alone exceed the fleet's memory.
pub fn max_kv_cache_tokens(
    fleet_size: u32,
    gpu_memory_gb: f64,
    params_billion: f64,
    kv_cache_gib_per_token: f64,
    bytes_per_param: u32,
) -> f64 {
    let free_gb =
        fleet_size as f64 * gpu_memory_gb - model_weights_gb(params_billion, bytes_per_param);
    let tokens = free_gb / kv_cache_gib_per_token;
    if tokens.is_nan() || tokens < 0.0 {
        0.0
    } else {
        tokens
    }
}

/// Prefill time per prompt token in milliseconds
///
/// `compute` is the GPU's throughput for the requested precision; `None`
/// yields [`Metric::Unsupported`].
pub fn prefill_time_per_token(fleet_size: u32, params_billion: f64, compute: Option<f64>) -> Metric {
    match compute {
        None => Metric::Unsupported,
        Some(throughput) => {
            Metric::checked((2.0 * params_billion / fleet_size as f64) / throughput)
        }
    }
}

/// Time per output token in milliseconds
///
/// Decoding streams every weight once per token, so TPOT is bandwidth bound.
pub fn time_per_output_token(
    fleet_size: u32,
    params_billion: f64,
    memory_bandwidth_gbps: f64,
) -> Metric {
    Metric::checked((2.0 * params_billion / fleet_size as f64) / memory_bandwidth_gbps * 1000.0)
}

/// End-to-end request latency in seconds
pub fn end_to_end_latency(
    prefill_ms: Metric,
    tpot_ms: Metric,
    prompt_tokens: u32,
    response_tokens: u32,
) -> Metric {
    match (prefill_ms, tpot_ms) {
        (Metric::Value(prefill), Metric::Value(tpot)) => Metric::checked(
            (prompt_tokens as f64 * prefill + response_tokens as f64 * tpot) / 1000.0,
        ),
        _ => Metric::NotComputable,
    }
}

/// Time to first token in seconds: the prompt's prefill plus one TPOT
pub fn time_to_first_token(prefill_ms: Metric, tpot_ms: Metric, prompt_tokens: u32) -> Metric {
    match (prefill_ms, tpot_ms) {
        (Metric::Value(prefill), Metric::Value(tpot)) => {
            Metric::checked(prefill * prompt_tokens as f64 / 1000.0 + tpot / 1000.0)
        }
        _ => Metric::NotComputable,
    }
}

/// Aggregate output tokens per second across `concurrency` requests
pub fn throughput(response_tokens: u32, e2e_latency_s: Metric, concurrency: u64) -> Metric {
    match e2e_latency_s {
        Metric::Value(latency) if latency > 0.0 => {
            Metric::checked(response_tokens as f64 / latency * concurrency as f64)
        }
        _ => Metric::NotComputable,
    }
}

/// Latency-related metrics of one fleet size, computed together
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyProfile {
    pub prefill_ms: Metric,
    pub tpot_ms: Metric,
    pub ttft_s: Metric,
    pub e2e_latency_s: Metric,
}

impl LatencyProfile {
    pub fn compute(
        fleet_size: u32,
        params_billion: f64,
        compute: Option<f64>,
        memory_bandwidth_gbps: f64,
        prompt_tokens: u32,
        response_tokens: u32,
    ) -> Self {
        let prefill_ms = prefill_time_per_token(fleet_size, params_billion, compute);
        let tpot_ms = time_per_output_token(fleet_size, params_billion, memory_bandwidth_gbps);
        Self {
            prefill_ms,
            tpot_ms,
            ttft_s: time_to_first_token(prefill_ms, tpot_ms, prompt_tokens),
            e2e_latency_s: end_to_end_latency(prefill_ms, tpot_ms, prompt_tokens, response_tokens),
        }
    }
}
