//! GPU and model catalogs
//!
//! A [`Catalog`] is the single data structure the planner is given. It can be
//! built from the defaults in [`Catalog::builtin`] or from files through the
//! [`loader`](crate::loader) module.

use crate::precision::Precision;
use gpuplan_shared::{GpuplanError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-precision compute throughput of one GPU
///
/// Field names match the catalog column names. `None` means the GPU cannot
/// run that precision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputeThroughput {
    #[serde(default)]
    pub int8_tops: Option<f64>,
    #[serde(default)]
    pub fp8_tflops: Option<f64>,
    #[serde(default)]
    pub fp16_tflops: Option<f64>,
    #[serde(default)]
    pub bf16_tflops: Option<f64>,
    #[serde(default)]
    pub tf32_tflops: Option<f64>,
    #[serde(default)]
    pub fp32_tflops: Option<f64>,
    #[serde(default)]
    pub fp64_tflops: Option<f64>,
}

impl ComputeThroughput {
    pub fn get(&self, precision: Precision) -> Option<f64> {
        match precision {
            Precision::Int8 => self.int8_tops,
            Precision::Fp8 => self.fp8_tflops,
            Precision::Fp16 => self.fp16_tflops,
            Precision::Bf16 => self.bf16_tflops,
            Precision::Tf32 => self.tf32_tflops,
            Precision::Fp32 => self.fp32_tflops,
            Precision::Fp64 => self.fp64_tflops,
        }
    }

    pub fn set(&mut self, precision: Precision, value: Option<f64>) {
        let slot = match precision {
            Precision::Int8 => &mut self.int8_tops,
            Precision::Fp8 => &mut self.fp8_tflops,
            Precision::Fp16 => &mut self.fp16_tflops,
            Precision::Bf16 => &mut self.bf16_tflops,
            Precision::Tf32 => &mut self.tf32_tflops,
            Precision::Fp32 => &mut self.fp32_tflops,
            Precision::Fp64 => &mut self.fp64_tflops,
        };
        *slot = value;
    }
}

/// One GPU type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuSpec {
    pub name: String,
    /// Device memory per unit
    pub memory_gb: f64,
    pub memory_bandwidth_gbps: f64,
    #[serde(flatten)]
    pub compute: ComputeThroughput,
    /// Operating cost per unit per day
    #[serde(default)]
    pub opex_per_day: Option<f64>,
    /// Acquisition cost per unit
    #[serde(default)]
    pub capex: Option<f64>,
    /// Interconnect form factor (SXM, PCIe, NVL)
    #[serde(default)]
    pub connectivity: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    /// Host memory attached to superchips; informational only
    #[serde(default)]
    pub grace_memory_gb: Option<f64>,
}

impl GpuSpec {
    /// Creates a spec with memory attributes only; compute and cost are unset
    pub fn new(name: impl Into<String>, memory_gb: f64, memory_bandwidth_gbps: f64) -> Self {
        Self {
            name: name.into(),
            memory_gb,
            memory_bandwidth_gbps,
            compute: ComputeThroughput::default(),
            opex_per_day: None,
            capex: None,
            connectivity: None,
            architecture: None,
            grace_memory_gb: None,
        }
    }

    pub fn with_compute(mut self, precision: Precision, throughput: f64) -> Self {
        self.compute.set(precision, Some(throughput));
        self
    }

    pub fn with_costs(mut self, opex_per_day: f64, capex: f64) -> Self {
        self.opex_per_day = Some(opex_per_day);
        self.capex = Some(capex);
        self
    }

    pub fn with_connectivity(mut self, connectivity: impl Into<String>) -> Self {
        self.connectivity = Some(connectivity.into());
        self
    }

    pub fn with_architecture(mut self, architecture: impl Into<String>, grace_memory_gb: f64) -> Self {
        self.architecture = Some(architecture.into());
        self.grace_memory_gb = Some(grace_memory_gb);
        self
    }

    /// Compute throughput for `precision`, `None` when unsupported
    pub fn compute_for(&self, precision: Precision) -> Option<f64> {
        self.compute.get(precision)
    }

    pub fn supports(&self, precision: Precision) -> bool {
        self.compute_for(precision).is_some()
    }

    pub fn validate(&self) -> Result<()> {
        let entity = format!("gpu '{}'", self.name);
        if self.name.trim().is_empty() {
            return Err(GpuplanError::invalid_spec("gpu", "name cannot be empty"));
        }
        if !is_positive(self.memory_gb) {
            return Err(GpuplanError::invalid_spec(entity, "memory_gb must be positive"));
        }
        if !is_positive(self.memory_bandwidth_gbps) {
            return Err(GpuplanError::invalid_spec(
                entity,
                "memory_bandwidth_gbps must be positive",
            ));
        }
        for precision in Precision::ALL {
            if let Some(value) = self.compute_for(precision) {
                if !is_positive(value) {
                    return Err(GpuplanError::invalid_spec(
                        entity,
                        format!("{} must be positive when present", precision.compute_key()),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// One transformer model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub params_billion: f64,
    pub d_model: u32,
    pub n_layers: u32,
    pub max_context_window: u32,
    #[serde(default)]
    pub n_heads: Option<u32>,
    #[serde(default)]
    pub d_head: Option<u32>,
}

impl ModelSpec {
    pub fn new(
        name: impl Into<String>,
        params_billion: f64,
        d_model: u32,
        n_layers: u32,
        max_context_window: u32,
    ) -> Self {
        Self {
            name: name.into(),
            params_billion,
            d_model,
            n_layers,
            max_context_window,
            n_heads: None,
            d_head: None,
        }
    }

    pub fn with_heads(mut self, n_heads: u32, d_head: u32) -> Self {
        self.n_heads = Some(n_heads);
        self.d_head = Some(d_head);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let entity = format!("model '{}'", self.name);
        if self.name.trim().is_empty() {
            return Err(GpuplanError::invalid_spec("model", "name cannot be empty"));
        }
        if !is_positive(self.params_billion) {
            return Err(GpuplanError::invalid_spec(entity, "params_billion must be positive"));
        }
        if self.n_layers == 0 {
            return Err(GpuplanError::invalid_spec(entity, "n_layers must be positive"));
        }
        if self.d_model == 0 {
            return Err(GpuplanError::invalid_spec(entity, "d_model must be positive"));
        }
        if self.max_context_window == 0 {
            return Err(GpuplanError::invalid_spec(
                entity,
                "max_context_window must be positive",
            ));
        }
        Ok(())
    }
}

/// GPU and model catalog injected into the planner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub gpus: Vec<GpuSpec>,
    #[serde(default)]
    pub models: Vec<ModelSpec>,
}

impl Catalog {
    /// Creates a validated catalog
    pub fn new(gpus: Vec<GpuSpec>, models: Vec<ModelSpec>) -> Result<Self> {
        let catalog = Self { gpus, models };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks every record and rejects duplicate names
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for gpu in &self.gpus {
            gpu.validate()?;
            if !seen.insert(gpu.name.to_lowercase()) {
                return Err(GpuplanError::invalid_spec(
                    format!("gpu '{}'", gpu.name),
                    "duplicate name in catalog",
                ));
            }
        }

        seen.clear();
        for model in &self.models {
            model.validate()?;
            if !seen.insert(model.name.to_lowercase()) {
                return Err(GpuplanError::invalid_spec(
                    format!("model '{}'", model.name),
                    "duplicate name in catalog",
                ));
            }
        }
        Ok(())
    }

    /// Looks a model up by case-insensitive name
    pub fn find_model(&self, name: &str) -> Result<&ModelSpec> {
        self.models
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| GpuplanError::model_not_found(name, self.model_names()))
    }

    pub fn find_gpu(&self, name: &str) -> Option<&GpuSpec> {
        self.gpus
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name.clone()).collect()
    }

    /// GPUs that have compute throughput for `precision`, in catalog order
    pub fn gpus_supporting(&self, precision: Precision) -> impl Iterator<Item = &GpuSpec> {
        self.gpus.iter().filter(move |g| g.supports(precision))
    }

    /// Keeps only the named GPUs, in catalog order
    ///
    /// Names match case-insensitively; a name missing from the catalog is a
    /// configuration error listing the known GPUs. An empty list keeps all.
    pub fn retain_gpus(&mut self, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(unknown) = names.iter().find(|name| self.find_gpu(name).is_none()) {
            let known: Vec<&str> = self.gpus.iter().map(|g| g.name.as_str()).collect();
            return Err(GpuplanError::configuration(
                format!(
                    "GPU '{}' not found in catalog (available: {})",
                    unknown,
                    known.join(", ")
                ),
                None,
            ));
        }
        self.gpus
            .retain(|gpu| names.iter().any(|name| gpu.name.eq_ignore_ascii_case(name.trim())));
        Ok(())
    }

    /// Default catalog of datacenter GPUs and open-weight models
    pub fn builtin() -> Self {
        Self {
            gpus: builtin_gpus(),
            models: builtin_models(),
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[allow(clippy::too_many_arguments)]
fn gpu(
    name: &str,
    memory_gb: f64,
    memory_bandwidth_gbps: f64,
    connectivity: &str,
    int8_tops: f64,
    fp8_tflops: Option<f64>,
    fp16_tflops: f64,
    tf32_tflops: f64,
    fp32_tflops: f64,
    fp64_tflops: f64,
) -> GpuSpec {
    let mut spec = GpuSpec::new(name, memory_gb, memory_bandwidth_gbps)
        .with_connectivity(connectivity)
        .with_compute(Precision::Int8, int8_tops)
        .with_compute(Precision::Fp16, fp16_tflops)
        .with_compute(Precision::Bf16, fp16_tflops)
        .with_compute(Precision::Tf32, tf32_tflops)
        .with_compute(Precision::Fp32, fp32_tflops)
        .with_compute(Precision::Fp64, fp64_tflops);
    spec.compute.fp8_tflops = fp8_tflops;
    spec
}

fn builtin_gpus() -> Vec<GpuSpec> {
    vec![
        gpu("A10", 24.0, 600.0, "PCIe", 250.0, None, 125.0, 62.5, 31.2, 1.2),
        gpu("A30", 24.0, 933.0, "PCIe", 661.0, None, 330.0, 165.0, 82.5, 5.2),
        gpu("L40", 48.0, 864.0, "PCIe", 362.0, None, 181.0, 90.5, 90.5, 2.8),
        gpu("L40S", 48.0, 864.0, "PCIe", 724.0, None, 362.0, 181.0, 181.0, 5.6),
        gpu("A100 40 GB SXM", 40.0, 1555.0, "SXM", 624.0, None, 312.0, 156.0, 19.5, 9.7)
            .with_costs(40.0, 15000.0),
        gpu("A100 80 GB PCIe", 80.0, 1935.0, "PCIe", 624.0, None, 312.0, 156.0, 19.5, 9.7)
            .with_costs(55.0, 20000.0),
        gpu("A100 80 GB SXM", 80.0, 2039.0, "SXM", 624.0, None, 312.0, 156.0, 19.5, 9.7)
            .with_costs(60.0, 22000.0),
        gpu("H100 PCIe", 80.0, 2000.0, "PCIe", 1513.0, Some(3026.0), 756.5, 378.2, 51.0, 26.0)
            .with_costs(80.0, 33000.0),
        gpu("H100 SXM", 80.0, 3350.0, "SXM", 1979.0, Some(3958.0), 989.5, 494.7, 67.0, 33.5)
            .with_costs(90.0, 35000.0),
        gpu("H100 NVL", 94.0, 3900.0, "NVL", 1671.0, Some(3342.0), 835.5, 417.7, 56.5, 28.2)
            .with_costs(95.0, 37000.0),
        gpu("H200 SXM", 141.0, 4800.0, "SXM", 1979.0, Some(3958.0), 989.5, 494.7, 67.0, 33.5)
            .with_costs(100.0, 40000.0),
        gpu("H200 NVL", 141.0, 4800.0, "NVL", 1671.0, Some(3342.0), 835.5, 417.7, 56.5, 28.2)
            .with_costs(105.0, 42000.0),
        gpu("B100 PCIe", 96.0, 3078.0, "PCIe", 2220.0, Some(4440.0), 1110.0, 555.0, 74.0, 37.0)
            .with_costs(110.0, 45000.0),
        gpu("B100 SXM", 96.0, 3078.0, "SXM", 2664.0, Some(5328.0), 1332.0, 666.0, 89.0, 44.5)
            .with_costs(120.0, 48000.0),
        gpu("B200 PCIe", 192.0, 5376.0, "PCIe", 2940.0, Some(5880.0), 1470.0, 735.0, 98.0, 49.0)
            .with_costs(140.0, 65000.0),
        gpu("B200 SXM", 192.0, 5376.0, "SXM", 3540.0, Some(7080.0), 1770.0, 885.0, 118.0, 59.0)
            .with_costs(150.0, 70000.0),
        gpu("GH100 (Grace Hopper)", 80.0, 3350.0, "SXM", 1979.0, Some(3958.0), 989.5, 494.7, 67.0, 33.5)
            .with_architecture("Grace Hopper", 480.0)
            .with_costs(110.0, 50000.0),
        gpu("GH200 (Grace Hopper)", 141.0, 4800.0, "NVL", 1979.0, Some(3958.0), 989.5, 494.7, 67.0, 33.5)
            .with_architecture("Grace Hopper", 480.0)
            .with_costs(130.0, 60000.0),
        gpu("GB100 (Grace Blackwell)", 96.0, 3078.0, "SXM", 2664.0, Some(5328.0), 1332.0, 666.0, 89.0, 44.5)
            .with_architecture("Grace Blackwell", 480.0)
            .with_costs(140.0, 65000.0),
        gpu("GB200 (Grace Blackwell)", 192.0, 5376.0, "NVL", 3540.0, Some(7080.0), 1770.0, 885.0, 118.0, 59.0)
            .with_architecture("Grace Blackwell", 576.0)
            .with_costs(160.0, 80000.0),
    ]
}

fn builtin_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec::new("Llama-3-8B", 8.0, 4096, 32, 8192).with_heads(32, 128),
        ModelSpec::new("Llama-3-70B", 70.0, 8192, 80, 8192).with_heads(64, 128),
        ModelSpec::new("Llama-3.1-8B", 8.0, 4096, 32, 131_072).with_heads(32, 128),
        ModelSpec::new("Llama-3.1-70B", 70.0, 8192, 80, 131_072).with_heads(64, 128),
        ModelSpec::new("Llama-3.1-405B", 405.0, 16384, 120, 131_072).with_heads(128, 128),
        ModelSpec::new("Mistral-7B-v0.3", 7.0, 4096, 32, 32768).with_heads(32, 128),
        ModelSpec::new("Falcon-7B", 7.0, 4544, 32, 2048).with_heads(71, 64),
        ModelSpec::new("Falcon-40B", 40.0, 8192, 60, 2048).with_heads(128, 64),
        ModelSpec::new("Falcon-180B", 180.0, 14848, 80, 2048).with_heads(232, 64),
        ModelSpec::new("Phi-3-mini", 3.8, 3072, 24, 8192).with_heads(32, 96),
        ModelSpec::new("Phi-3-medium", 14.0, 5120, 48, 8192).with_heads(40, 128),
        ModelSpec::new("Qwen2-7B", 7.0, 4096, 32, 131_072).with_heads(32, 128),
        ModelSpec::new("Qwen2-72B", 72.0, 8192, 80, 131_072).with_heads(64, 128),
        ModelSpec::new("DeepSeek-R1-8B", 8.0, 4096, 32, 32768).with_heads(32, 128),
        ModelSpec::new("DeepSeek-R1-33B", 33.0, 6144, 48, 32768).with_heads(48, 128),
        ModelSpec::new("DeepSeek-R1-70B", 70.0, 8192, 72, 32768).with_heads(64, 128),
        ModelSpec::new("DeepSeek-V2-236B", 236.0, 12288, 120, 32768).with_heads(96, 128),
        ModelSpec::new("DeepSeek-R1-671B", 671.0, 16384, 168, 32768).with_heads(128, 128),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.gpus.len(), 20);
        assert_eq!(catalog.models.len(), 18);
    }

    #[test]
    fn test_find_model_case_insensitive() {
        let catalog = Catalog::builtin();
        let model = catalog.find_model("llama-3-70b").unwrap();
        assert_eq!(model.name, "Llama-3-70B");
        assert_eq!(model.n_layers, 80);
    }

    #[test]
    fn test_find_model_missing_lists_names() {
        let catalog = Catalog::builtin();
        match catalog.find_model("GPT-5") {
            Err(GpuplanError::ModelNotFound { name, available }) => {
                assert_eq!(name, "GPT-5");
                assert_eq!(available.len(), 18);
                assert!(available.contains(&"DeepSeek-R1-671B".to_string()));
            }
            other => panic!("expected ModelNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_fp8_support_matches_hardware_generation() {
        let catalog = Catalog::builtin();
        assert!(!catalog.find_gpu("A100 80 GB SXM").unwrap().supports(Precision::Fp8));
        assert!(catalog.find_gpu("H100 PCIe").unwrap().supports(Precision::Fp8));
        assert_eq!(catalog.gpus_supporting(Precision::Fp8).count(), 13);
        assert_eq!(catalog.gpus_supporting(Precision::Fp16).count(), 20);
    }

    #[test]
    fn test_retain_gpus() {
        let mut catalog = Catalog::builtin();
        catalog
            .retain_gpus(&["h100 sxm".to_string(), "A10".to_string()])
            .unwrap();
        let names: Vec<_> = catalog.gpus.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["A10", "H100 SXM"]);

        let err = catalog.retain_gpus(&["TPU v5".to_string()]).unwrap_err();
        assert!(err.to_string().contains("TPU v5"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let gpus = vec![
            GpuSpec::new("X", 80.0, 2000.0),
            GpuSpec::new("x", 40.0, 1000.0),
        ];
        let err = Catalog::new(gpus, vec![]).unwrap_err();
        assert!(err.to_string().contains("duplicate name"));
    }

    #[test]
    fn test_invalid_specs_rejected() {
        assert!(GpuSpec::new("Z", 0.0, 100.0).validate().is_err());
        assert!(GpuSpec::new("Z", 10.0, 0.0).validate().is_err());
        assert!(GpuSpec::new("Z", 10.0, 10.0)
            .with_compute(Precision::Fp16, -1.0)
            .validate()
            .is_err());
        assert!(ModelSpec::new("m", 7.0, 4096, 0, 4096).validate().is_err());
        assert!(ModelSpec::new("m", 0.0, 4096, 32, 4096).validate().is_err());
        assert!(ModelSpec::new("m", 7.0, 0, 32, 4096).validate().is_err());
    }
}
