//! # gpuplan Planner
//!
//! Closed-form capacity planning for serving large language models on fleets
//! of identical GPUs.
//!
//! ## Features
//!
//! - Memory footprint of weights and KV cache per precision
//! - Prefill, TPOT, TTFT and end-to-end latency estimates
//! - Compute-bound and memory-bound fleet sizing with a bounded search
//! - Catalog-wide ranking with monthly opex and total capex
//! - Fixed-fleet estimation with OOM warnings
//! - Built-in GPU and model catalog, replaceable from TSV or JSON files
//!
//! ## Example
//!
//! ```rust
//! use gpuplan_planner::{Catalog, PerformanceTarget, Precision, Recommender};
//!
//! let catalog = Catalog::builtin();
//! let target = PerformanceTarget::new(500.0, 10.0, 4096, 256, Precision::Fp16).unwrap();
//! let recommendation = Recommender::default()
//!     .recommend_for(&catalog, "Llama-3-70B", &target)
//!     .unwrap();
//! assert!(recommendation.recommended().is_some());
//! ```

pub mod capacity;
pub mod catalog;
pub mod cli_options;
pub mod config;
pub mod cost_analysis;
pub mod estimator;
pub mod loader;
pub mod metric;
pub mod perf_model;
pub mod precision;
pub mod recommender;
pub mod report;
pub mod target;

pub use capacity::{BindingConstraint, CapacityPlanner, MemoryRequirements, PlanResult};
pub use catalog::{Catalog, ComputeThroughput, GpuSpec, ModelSpec};
pub use cli_options::{
    CatalogCliOptions, CatalogOptions, CatalogView, EstimateCliOptions, PlanCliOptions,
};
pub use config::{ComputeSearchPolicy, PlannerConfig};
pub use cost_analysis::FleetCost;
pub use estimator::{EstimateReport, EstimateRequest, Estimator, MemoryStatus};
pub use loader::CatalogSource;
pub use metric::Metric;
pub use precision::Precision;
pub use recommender::{Outcome, Recommendation, Recommender};
pub use target::PerformanceTarget;
