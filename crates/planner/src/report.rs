//! Report rendering
//!
//! Plans and estimates are rendered either as org-mode tables for terminals
//! or as pretty-printed JSON for scripts.

use crate::capacity::PlanResult;
use crate::catalog::Catalog;
use crate::estimator::EstimateReport;
use crate::recommender::{Outcome, Recommendation};
use gpuplan_shared::Result;
use serde::Serialize;
use std::fmt::Write;

/// An org-mode table
///
/// ```text
/// | GPU       | Fleet |
/// |-----------+-------|
/// | H100 PCIe |     4 |
/// ```
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in std::iter::once(&self.headers).chain(&self.rows) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        render_line(&mut out, &self.headers, &widths, false);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        out.push('|');
        out.push_str(&rule.join("+"));
        out.push_str("|\n");
        for row in &self.rows {
            render_line(&mut out, row, &widths, true);
        }
        out
    }
}

fn render_line(out: &mut String, cells: &[String], widths: &[usize], align_numbers: bool) {
    out.push('|');
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        if align_numbers && looks_numeric(cell) {
            let _ = write!(out, " {:>width$} |", cell, width = width);
        } else {
            let _ = write!(out, " {:<width$} |", cell, width = width);
        }
    }
    out.push('\n');
}

fn looks_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

/// Formats an amount as `$12,345.67`
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", amount.abs());
    let (whole, fraction) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{}${}.{}", sign, grouped, fraction)
}

fn currency_or_na(amount: Option<f64>) -> String {
    amount.map(format_currency).unwrap_or_else(|| "N/A".to_string())
}

/// Pretty-printed JSON for any report type
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One row per planned GPU, in ranking order
pub fn plan_table(plans: &[PlanResult]) -> Table {
    let precision = plans
        .first()
        .map(|p| p.precision.as_str())
        .unwrap_or("compute");
    let mut table = Table::new([
        "GPU Model".to_string(),
        "GPUs Needed".to_string(),
        "KV Cache Memory".to_string(),
        "Memory Limited By".to_string(),
        "Compute Limited By".to_string(),
        "Binding".to_string(),
        "Meets Requirements".to_string(),
        format!("Prefill ({})", precision),
        "TPOT".to_string(),
        "TTFT".to_string(),
        "E2E Latency".to_string(),
        "Throughput".to_string(),
        "Monthly Opex".to_string(),
        "Total Capex".to_string(),
    ]);

    for plan in plans {
        let compute = if plan.compute_bound_met {
            format!("{} GPUs", plan.compute_fleet_size)
        } else {
            format!(">{} GPUs", plan.compute_fleet_size)
        };
        table.push_row([
            plan.gpu_name.clone(),
            plan.fleet_size.to_string(),
            format!("{:.2} GB", plan.kv_cache_gb),
            format!("{} GPUs", plan.memory_fleet_size),
            compute,
            plan.binding.as_str().to_string(),
            if plan.meets_target { "Yes" } else { "No" }.to_string(),
            plan.prefill_ms.display_with(3, "ms"),
            plan.tpot_ms.display_with(3, "ms"),
            plan.ttft_s.display_with(3, "s"),
            plan.e2e_latency_s.display_with(3, "s"),
            plan.throughput_tps.display_with(2, "tokens/s"),
            currency_or_na(plan.cost.monthly_opex),
            currency_or_na(plan.cost.total_capex),
        ]);
    }
    table
}

/// Full text report of a recommendation run
pub fn render_recommendation(recommendation: &Recommendation) -> String {
    let target = &recommendation.target;
    let memory = &recommendation.memory;
    let mut out = String::new();

    let _ = writeln!(out, "*** GPU Requirements for {} ***", recommendation.model_name);
    let _ = writeln!(out, "Target token rate: {} tokens/sec", target.token_rate);
    let _ = writeln!(out, "Maximum latency: {} seconds", target.max_latency);
    let _ = writeln!(
        out,
        "Prompt size: {} tokens, Response size: {} tokens",
        target.prompt_tokens, target.response_tokens
    );
    let _ = writeln!(out, "Precision: {}", target.precision);
    let _ = writeln!(
        out,
        "Required concurrent requests: {}",
        recommendation.concurrency
    );

    out.push_str("\nMemory Requirements:\n");
    let _ = writeln!(
        out,
        "KV Cache per token: {:.6} GiB/token",
        memory.kv_cache_gib_per_token
    );
    let _ = writeln!(out, "Memory per request: {:.2} GB", memory.memory_per_request_gb);
    let _ = writeln!(out, "Model parameters: {:.2} GB", memory.model_weights_gb);
    let _ = writeln!(out, "Total memory required: {:.2} GB", memory.total_memory_gb);

    if !recommendation.skipped_gpus.is_empty() {
        let _ = writeln!(
            out,
            "\nSkipped (no {} support): {}",
            target.precision,
            recommendation.skipped_gpus.join(", ")
        );
    }

    out.push_str("\nGPU Requirements Analysis:\n");
    out.push_str(&plan_table(&recommendation.plans).render());

    match &recommendation.outcome {
        Outcome::Recommended { plan } => {
            out.push_str("\nRecommended Configuration:\n");
            let _ = writeln!(out, "- {}x {} GPUs", plan.fleet_size, plan.gpu_name);
            let _ = writeln!(
                out,
                "- Expected throughput: {}",
                plan.throughput_tps.display_with(2, "tokens/s")
            );
            let _ = writeln!(
                out,
                "- Expected latency: {}",
                plan.e2e_latency_s.display_with(3, "s")
            );
            let _ = writeln!(
                out,
                "- Monthly operating cost: {}",
                currency_or_na(plan.cost.monthly_opex)
            );
            let _ = writeln!(
                out,
                "- Total acquisition cost: {}",
                currency_or_na(plan.cost.total_capex)
            );
        }
        Outcome::NoViableConfiguration {
            closest,
            suggestions,
        } => {
            out.push_str(
                "\nNo viable configurations found that meet both token rate and latency requirements.\n",
            );
            if let Some(plan) = closest {
                let _ = writeln!(
                    out,
                    "Closest candidate: {}x {} (E2E {}, throughput {})",
                    plan.fleet_size,
                    plan.gpu_name,
                    plan.e2e_latency_s.display_with(3, "s"),
                    plan.throughput_tps.display_with(2, "tokens/s")
                );
            }
            out.push_str("Consider:\n");
            for suggestion in suggestions {
                let _ = writeln!(out, "- {}", suggestion);
            }
        }
    }
    out
}

/// Full text report of a fixed-fleet estimate
pub fn render_estimate(report: &EstimateReport) -> String {
    let request = &report.request;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "fleet_size = {}, prompt_size = {} tokens, response_size = {} tokens",
        request.fleet_size, request.prompt_tokens, request.response_tokens
    );
    let _ = writeln!(
        out,
        "concurrency = {}, precision = {} ({} bytes per parameter)",
        request.concurrency, request.precision, report.bytes_per_param
    );

    out.push_str("\n*** Memory Footprint ***\n");
    let mut footprints = Table::new(["Model", "KV Cache Size per Token", "Memory Footprint"]);
    for footprint in &report.footprints {
        footprints.push_row([
            footprint.model_name.clone(),
            format!("{:.6} GiB/token", footprint.kv_cache_gib_per_token),
            format!("{:.2} GB", footprint.footprint_gb),
        ]);
    }
    out.push_str(&footprints.render());

    out.push_str("\n*** OOM Warnings ***\n");
    if report.oom_warnings.is_empty() {
        out.push_str("No OOM issues detected with current configuration.\n");
    } else {
        let mut warnings = Table::new([
            "Model",
            "GPU",
            "Footprint",
            "Available",
            "Max Concurrent Requests",
        ]);
        for warning in &report.oom_warnings {
            warnings.push_row([
                warning.model_name.clone(),
                format!("{}x {}", request.fleet_size, warning.gpu_name),
                format!("{:.2} GB", warning.footprint_gb),
                format!("{:.2} GB", warning.available_gb),
                warning.max_concurrency.to_string(),
            ]);
        }
        out.push_str(&warnings.render());
    }

    let _ = writeln!(
        out,
        "\n*** Performance with {} Precision ***",
        request.precision.as_str().to_uppercase()
    );
    if !report.precision_supported {
        let _ = writeln!(
            out,
            "No GPUs in the catalog support {} precision.",
            request.precision.as_str().to_uppercase()
        );
        return out;
    }

    let mut performance = Table::new([
        "Model".to_string(),
        "GPU".to_string(),
        "Memory Status".to_string(),
        "Max KV Cache Tokens".to_string(),
        format!("Prefill ({})", request.precision),
        "TPOT".to_string(),
        "TTFT".to_string(),
        "E2E Latency".to_string(),
        "Throughput".to_string(),
    ]);
    for row in &report.performance {
        performance.push_row([
            row.model_name.clone(),
            row.gpu_name.clone(),
            row.memory_status.as_str().to_string(),
            row.max_kv_cache_tokens.to_string(),
            row.prefill_ms.display_with(3, "ms"),
            row.tpot_ms.display_with(3, "ms"),
            row.ttft_s.display_with(3, "s"),
            row.e2e_latency_s.display_with(1, "s"),
            row.throughput_tps.display_with(2, "tokens/s"),
        ]);
    }
    out.push_str(&performance.render());
    out
}

pub fn gpu_table(catalog: &Catalog) -> Table {
    let mut table = Table::new([
        "GPU",
        "Memory",
        "Bandwidth",
        "Connectivity",
        "INT8 TOPS",
        "FP8",
        "FP16",
        "BF16",
        "TF32",
        "FP32",
        "FP64",
        "Opex/day",
        "Capex",
    ]);
    let number = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
    for gpu in &catalog.gpus {
        let compute = &gpu.compute;
        let mut name = gpu.name.clone();
        if let (Some(arch), Some(grace)) = (&gpu.architecture, gpu.grace_memory_gb) {
            let _ = write!(name, " [{}, +{} GB]", arch, grace);
        }
        table.push_row([
            name,
            format!("{} GB", gpu.memory_gb),
            format!("{} GB/s", gpu.memory_bandwidth_gbps),
            gpu.connectivity.clone().unwrap_or_else(|| "-".into()),
            number(compute.int8_tops),
            number(compute.fp8_tflops),
            number(compute.fp16_tflops),
            number(compute.bf16_tflops),
            number(compute.tf32_tflops),
            number(compute.fp32_tflops),
            number(compute.fp64_tflops),
            currency_or_na(gpu.opex_per_day),
            currency_or_na(gpu.capex),
        ]);
    }
    table
}

pub fn model_table(catalog: &Catalog) -> Table {
    let mut table = Table::new([
        "Model",
        "Params (B)",
        "d_model",
        "Layers",
        "Heads",
        "d_head",
        "Max Context",
    ]);
    let optional = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_else(|| "-".into());
    for model in &catalog.models {
        table.push_row([
            model.name.clone(),
            model.params_billion.to_string(),
            model.d_model.to_string(),
            model.n_layers.to_string(),
            optional(model.n_heads),
            optional(model.d_head),
            model.max_context_window.to_string(),
        ]);
    }
    table
}
