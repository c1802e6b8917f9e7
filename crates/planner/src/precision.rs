//! Numeric precision table
//!
//! Maps a precision identifier to the bytes each parameter occupies and to the
//! catalog column holding the GPU's compute throughput for that precision.

use clap::ValueEnum;
use gpuplan_shared::{GpuplanError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bytes per parameter assumed for identifiers outside the table
pub const DEFAULT_BYTES_PER_PARAM: u32 = 2;

/// Numeric representation used for weights, KV cache and arithmetic
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[value(name = "int8")]
    Int8,
    #[value(name = "fp8")]
    Fp8,
    #[value(name = "fp16")]
    Fp16,
    #[value(name = "bf16")]
    Bf16,
    #[value(name = "tf32")]
    Tf32,
    #[value(name = "fp32")]
    Fp32,
    #[value(name = "fp64")]
    Fp64,
}

impl Precision {
    /// Every supported precision, in table order
    pub const ALL: [Precision; 7] = [
        Precision::Int8,
        Precision::Fp8,
        Precision::Fp16,
        Precision::Bf16,
        Precision::Tf32,
        Precision::Fp32,
        Precision::Fp64,
    ];

    /// Storage size of one parameter
    pub fn bytes_per_param(&self) -> u32 {
        match self {
            Precision::Int8 | Precision::Fp8 => 1,
            Precision::Fp16 | Precision::Bf16 => 2,
            Precision::Tf32 | Precision::Fp32 => 4,
            Precision::Fp64 => 8,
        }
    }

    /// Catalog column that holds compute throughput for this precision
    pub fn compute_key(&self) -> &'static str {
        match self {
            Precision::Int8 => "int8_tops",
            Precision::Fp8 => "fp8_tflops",
            Precision::Fp16 => "fp16_tflops",
            Precision::Bf16 => "bf16_tflops",
            Precision::Tf32 => "tf32_tflops",
            Precision::Fp32 => "fp32_tflops",
            Precision::Fp64 => "fp64_tflops",
        }
    }

    /// Lowercase identifier, e.g. `fp16`
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Int8 => "int8",
            Precision::Fp8 => "fp8",
            Precision::Fp16 => "fp16",
            Precision::Bf16 => "bf16",
            Precision::Tf32 => "tf32",
            Precision::Fp32 => "fp32",
            Precision::Fp64 => "fp64",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = GpuplanError;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim().to_lowercase();
        Precision::ALL
            .into_iter()
            .find(|p| p.as_str() == id)
            .ok_or_else(|| {
                GpuplanError::configuration(
                    format!(
                        "Unknown precision '{}' (expected one of: int8, fp8, fp16, bf16, tf32, fp32, fp64)",
                        s
                    ),
                    None,
                )
            })
    }
}

/// Bytes per parameter for an arbitrary identifier
///
/// Library entry point for callers holding raw precision strings, e.g. from
/// their own configuration files. The planner and the CLI work with
/// [`Precision`] and never reach this path. Identifiers outside the table
/// fall back to [`DEFAULT_BYTES_PER_PARAM`].
///
/// ```rust
/// use gpuplan_planner::precision::{bytes_per_parameter, compute_key};
///
/// assert_eq!(bytes_per_parameter("FP8"), 1);
/// assert_eq!(bytes_per_parameter("int4"), 2);
/// assert_eq!(compute_key("int4"), None);
/// ```
pub fn bytes_per_parameter(id: &str) -> u32 {
    id.parse::<Precision>()
        .map(|p| p.bytes_per_param())
        .unwrap_or(DEFAULT_BYTES_PER_PARAM)
}

/// Compute column for an arbitrary identifier
///
/// Counterpart of [`bytes_per_parameter`] for raw identifiers. Unknown
/// identifiers have no column, so no GPU supports them.
pub fn compute_key(id: &str) -> Option<&'static str> {
    id.parse::<Precision>().ok().map(|p| p.compute_key())
}
