//! Catalog-wide recommendation
//!
//! Runs the [`CapacityPlanner`] against every GPU in a catalog, ranks the
//! outcomes and picks the first configuration that meets the target.
//!
//! Planning may fan out over rayon's pool; results are always collected in
//! catalog order and ranked by one sequential sort, so the output does not
//! depend on scheduling.

use crate::capacity::{CapacityPlanner, MemoryRequirements, PlanResult};
use crate::catalog::{Catalog, GpuSpec, ModelSpec};
use crate::config::PlannerConfig;
use crate::target::PerformanceTarget;
use gpuplan_shared::Result;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

/// Outcome of a recommendation run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The best feasible configuration
    Recommended { plan: PlanResult },
    /// No configuration met the target
    NoViableConfiguration {
        /// Lowest-fleet-size plan, kept for diagnostics
        closest: Option<PlanResult>,
        suggestions: Vec<String>,
    },
}

/// Every ranked plan for one model and target, plus the chosen outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub model_name: String,
    pub target: PerformanceTarget,
    pub concurrency: u64,
    pub memory: MemoryRequirements,
    /// Plans ordered by fleet size, total capex and catalog order
    pub plans: Vec<PlanResult>,
    /// GPUs without compute throughput for the requested precision
    pub skipped_gpus: Vec<String>,
    pub outcome: Outcome,
}

impl Recommendation {
    pub fn recommended(&self) -> Option<&PlanResult> {
        match &self.outcome {
            Outcome::Recommended { plan } => Some(plan),
            Outcome::NoViableConfiguration { .. } => None,
        }
    }

    pub fn feasible_plans(&self) -> impl Iterator<Item = &PlanResult> {
        self.plans.iter().filter(|p| p.is_feasible())
    }
}

/// Ranks fleets across a whole catalog
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    planner: CapacityPlanner,
}

impl Recommender {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            planner: CapacityPlanner::new(config),
        }
    }

    pub fn planner(&self) -> &CapacityPlanner {
        &self.planner
    }

    /// Resolves `model_name` in the catalog, then recommends a fleet for it
    ///
    /// Fails with [`GpuplanError::ModelNotFound`](gpuplan_shared::GpuplanError::ModelNotFound)
    /// listing the available names when the lookup misses.
    pub fn recommend_for(
        &self,
        catalog: &Catalog,
        model_name: &str,
        target: &PerformanceTarget,
    ) -> Result<Recommendation> {
        let model = catalog.find_model(model_name)?;
        self.recommend(&catalog.gpus, model, target)
    }

    /// Plans `model` on every GPU and picks the best feasible fleet
    ///
    /// GPUs lacking the requested precision are skipped; any other planning
    /// error aborts the run.
    pub fn recommend(
        &self,
        gpus: &[GpuSpec],
        model: &ModelSpec,
        target: &PerformanceTarget,
    ) -> Result<Recommendation> {
        target.validate()?;
        info!(
            model = %model.name,
            gpus = gpus.len(),
            precision = %target.precision,
            "Planning fleets across catalog"
        );

        let outcomes: Vec<Result<PlanResult>> = if self.planner.config().parallel {
            gpus.par_iter()
                .enumerate()
                .map(|(index, gpu)| self.planner.plan_at(index, gpu, model, target))
                .collect()
        } else {
            gpus.iter()
                .enumerate()
                .map(|(index, gpu)| self.planner.plan_at(index, gpu, model, target))
                .collect()
        };

        let mut plans = Vec::with_capacity(outcomes.len());
        let mut skipped_gpus = Vec::new();
        for (gpu, outcome) in gpus.iter().zip(outcomes) {
            match outcome {
                Ok(plan) => plans.push(plan),
                Err(e) if e.is_skippable() => {
                    debug!(gpu = %gpu.name, error = %e, "Skipping GPU");
                    skipped_gpus.push(gpu.name.clone());
                }
                Err(e) => return Err(e),
            }
        }

        rank(&mut plans);

        let outcome = match plans.iter().find(|p| p.is_feasible()) {
            Some(best) => {
                info!(
                    gpu = %best.gpu_name,
                    fleet_size = best.fleet_size,
                    "Recommended configuration"
                );
                Outcome::Recommended { plan: best.clone() }
            }
            None => {
                info!(model = %model.name, "No viable configuration");
                Outcome::NoViableConfiguration {
                    closest: plans.first().cloned(),
                    suggestions: suggestions(&plans),
                }
            }
        };

        Ok(Recommendation {
            model_name: model.name.clone(),
            target: target.clone(),
            concurrency: target.concurrency(),
            memory: MemoryRequirements::for_target(model, target),
            plans,
            skipped_gpus,
            outcome,
        })
    }
}

/// Sorts by fleet size, then total capex with unpriced GPUs last, then catalog order
pub fn rank(plans: &mut [PlanResult]) {
    plans.sort_by(|a, b| {
        a.fleet_size
            .cmp(&b.fleet_size)
            .then_with(|| compare_capex(a.cost.total_capex, b.cost.total_capex))
            .then_with(|| a.catalog_index.cmp(&b.catalog_index))
    });
}

fn compare_capex(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn suggestions(plans: &[PlanResult]) -> Vec<String> {
    let mut suggestions = vec![
        "Reduce the target token rate".to_string(),
        "Increase the maximum acceptable latency".to_string(),
        "Use more powerful GPUs or a different precision".to_string(),
    ];
    if plans.is_empty() {
        suggestions.push("No GPU in the catalog supports the requested precision".to_string());
    } else if plans.iter().any(|p| !p.within_ceiling) {
        suggestions.push("Raise the fleet ceiling if larger fleets are acceptable".to_string());
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precision::Precision;

    fn gpu(name: &str, capex: Option<f64>) -> GpuSpec {
        let mut gpu = GpuSpec::new(name, 80.0, 2000.0).with_compute(Precision::Fp16, 756.5);
        gpu.capex = capex;
        gpu
    }

    #[test]
    fn test_rank_ties_break_on_capex_then_catalog_order() {
        let model = ModelSpec::new("m", 7.0, 4096, 32, 8192);
        let target = PerformanceTarget::new(10.0, 60.0, 128, 128, Precision::Fp16)
            .unwrap()
            .with_max_concurrent(1)
            .unwrap();
        let gpus = vec![
            gpu("unpriced", None),
            gpu("expensive", Some(30_000.0)),
            gpu("cheap-a", Some(10_000.0)),
            gpu("cheap-b", Some(10_000.0)),
        ];

        let recommendation = Recommender::default()
            .recommend(&gpus, &model, &target)
            .unwrap();
        let order: Vec<_> = recommendation
            .plans
            .iter()
            .map(|p| p.gpu_name.as_str())
            .collect();
        assert_eq!(order, vec!["cheap-a", "cheap-b", "expensive", "unpriced"]);
        assert_eq!(recommendation.recommended().unwrap().gpu_name, "cheap-a");
    }

    #[test]
    fn test_compare_capex_absent_last() {
        assert_eq!(compare_capex(Some(1.0), None), Ordering::Less);
        assert_eq!(compare_capex(None, Some(1.0)), Ordering::Greater);
        assert_eq!(compare_capex(None, None), Ordering::Equal);
        assert_eq!(compare_capex(Some(2.0), Some(1.0)), Ordering::Greater);
    }

    #[test]
    fn test_no_supported_gpu_suggestion() {
        let model = ModelSpec::new("m", 7.0, 4096, 32, 8192);
        let target = PerformanceTarget::new(10.0, 60.0, 128, 128, Precision::Fp8).unwrap();
        let recommendation = Recommender::default()
            .recommend(&[gpu("a", None)], &model, &target)
            .unwrap();

        assert_eq!(recommendation.skipped_gpus, vec!["a".to_string()]);
        match recommendation.outcome {
            Outcome::NoViableConfiguration {
                closest,
                suggestions,
            } => {
                assert!(closest.is_none());
                assert!(suggestions.iter().any(|s| s.contains("precision")));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
