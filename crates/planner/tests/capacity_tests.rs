//! Fleet sizing and recommendation tests against the built-in catalog
//!
//! The reference workload is Llama-3-70B (80 layers, d_model 8192) on an
//! H100 PCIe (80 GB, 2000 GB/s, 756.5 TFLOPS fp16).

use gpuplan_planner::{
    BindingConstraint, CapacityPlanner, Catalog, ComputeSearchPolicy, GpuSpec, Metric, ModelSpec,
    Outcome, PerformanceTarget, PlannerConfig, Precision, Recommender,
};
use gpuplan_shared::GpuplanError;

fn h100_pcie(catalog: &Catalog) -> &GpuSpec {
    catalog.find_gpu("H100 PCIe").unwrap()
}

fn llama_70b(catalog: &Catalog) -> &ModelSpec {
    catalog.find_model("Llama-3-70B").unwrap()
}

fn tight_target(concurrency: u32) -> PerformanceTarget {
    PerformanceTarget::new(100.0, 0.2, 4096, 256, Precision::Fp16)
        .unwrap()
        .with_max_concurrent(concurrency)
        .unwrap()
}

#[test]
fn test_compute_and_memory_bound_agree() {
    let catalog = Catalog::builtin();
    let plan = CapacityPlanner::default()
        .plan(h100_pcie(&catalog), llama_70b(&catalog), &tight_target(10))
        .unwrap();

    // Prefill of 4096 tokens takes 0.253 s on 3 GPUs and 0.190 s on 4
    assert_eq!(plan.compute_fleet_size, 4);
    assert!(plan.compute_bound_met);
    assert_eq!(plan.memory_fleet_size, 4);
    assert_eq!(plan.binding, BindingConstraint::Both);
    assert_eq!(plan.fleet_size, 4);

    // Decoding 256 tokens at 17.5 ms each blows the 0.2 s budget
    assert!((plan.tpot_ms.value().unwrap() - 17.5).abs() < 1e-9);
    assert!(plan.e2e_latency_s.value().unwrap() > 4.6);
    assert!(!plan.meets_target);
    assert!(plan.within_ceiling);
}

#[test]
fn test_compute_bound_binding() {
    let catalog = Catalog::builtin();
    let plan = CapacityPlanner::default()
        .plan(h100_pcie(&catalog), llama_70b(&catalog), &tight_target(1))
        .unwrap();

    // 140 GB of weights plus 10.6 GB of KV cache fits on 2 GPUs
    assert!((plan.total_memory_gb - 150.625).abs() < 1e-9);
    assert_eq!(plan.memory_fleet_size, 2);
    assert_eq!(plan.compute_fleet_size, 4);
    assert_eq!(plan.binding, BindingConstraint::Compute);
}

#[test]
fn test_compute_search_stops_at_ceiling() {
    let catalog = Catalog::builtin();
    let target = PerformanceTarget::new(100.0, 1e-6, 4096, 256, Precision::Fp16)
        .unwrap()
        .with_max_concurrent(1)
        .unwrap();
    let plan = CapacityPlanner::default()
        .plan(h100_pcie(&catalog), llama_70b(&catalog), &target)
        .unwrap();

    assert_eq!(plan.compute_fleet_size, 128);
    assert!(!plan.compute_bound_met);
    assert_eq!(plan.fleet_size, 128);
    assert!(!plan.meets_target);
}

#[test]
fn test_custom_ceiling() {
    let catalog = Catalog::builtin();
    let target = PerformanceTarget::new(100.0, 1e-6, 4096, 256, Precision::Fp16)
        .unwrap()
        .with_max_concurrent(1)
        .unwrap();
    let planner = CapacityPlanner::new(PlannerConfig {
        fleet_ceiling: 16,
        ..Default::default()
    });
    let plan = planner
        .plan(h100_pcie(&catalog), llama_70b(&catalog), &target)
        .unwrap();
    assert_eq!(plan.compute_fleet_size, 16);
}

#[test]
fn test_derived_concurrency_grows_fleet_with_latency_budget() {
    // Without max_concurrent, a looser budget admits more requests in flight,
    // so the KV cache and the memory-bound fleet grow with it
    let catalog = Catalog::builtin();
    let gpu = catalog.find_gpu("H100 SXM").unwrap();
    let planner = CapacityPlanner::default();

    let plans: Vec<_> = [1.0, 10.0, 100.0]
        .into_iter()
        .map(|latency| {
            let target = PerformanceTarget::new(5000.0, latency, 4096, 256, Precision::Fp16).unwrap();
            planner.plan(gpu, llama_70b(&catalog), &target).unwrap()
        })
        .collect();

    let concurrency: Vec<u64> = plans.iter().map(|p| p.concurrency).collect();
    assert_eq!(concurrency, vec![20, 196, 1954]);
    assert!(plans.windows(2).all(|w| w[1].fleet_size > w[0].fleet_size));
    assert!(plans.iter().all(|p| p.binding == BindingConstraint::Memory));

    // Pinning concurrency restores the non-increasing fleet
    let pinned: Vec<u32> = [1.0, 10.0, 100.0]
        .into_iter()
        .map(|latency| {
            let target = PerformanceTarget::new(5000.0, latency, 4096, 256, Precision::Fp16)
                .unwrap()
                .with_max_concurrent(20)
                .unwrap();
            planner.plan(gpu, llama_70b(&catalog), &target).unwrap().fleet_size
        })
        .collect();
    assert!(pinned.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn test_plan_costs() {
    let catalog = Catalog::builtin();
    let plan = CapacityPlanner::default()
        .plan(h100_pcie(&catalog), llama_70b(&catalog), &tight_target(10))
        .unwrap();
    assert_eq!(plan.cost.monthly_opex, Some(4.0 * 80.0 * 30.0));
    assert_eq!(plan.cost.total_capex, Some(4.0 * 33_000.0));

    let l40s = catalog.find_gpu("L40S").unwrap();
    let plan = CapacityPlanner::default()
        .plan(l40s, llama_70b(&catalog), &tight_target(10))
        .unwrap();
    assert_eq!(plan.cost.monthly_opex, None);
    assert_eq!(plan.cost.total_capex, None);
}

#[test]
fn test_unsupported_precision_is_an_error() {
    let catalog = Catalog::builtin();
    let a100 = catalog.find_gpu("A100 80 GB SXM").unwrap();
    let target = PerformanceTarget::new(100.0, 10.0, 4096, 256, Precision::Fp8).unwrap();

    match CapacityPlanner::default().plan(a100, llama_70b(&catalog), &target) {
        Err(GpuplanError::UnsupportedPrecision { gpu, precision }) => {
            assert_eq!(gpu, "A100 80 GB SXM");
            assert_eq!(precision, "fp8");
        }
        other => panic!("expected UnsupportedPrecision, got {:?}", other),
    }
}

#[test]
fn test_end_to_end_search_meets_latency_when_feasible() {
    let catalog = Catalog::builtin();
    let planner = CapacityPlanner::new(PlannerConfig {
        compute_search: ComputeSearchPolicy::EndToEnd,
        ..Default::default()
    });
    let target = PerformanceTarget::new(50.0, 2.0, 4096, 256, Precision::Fp16)
        .unwrap()
        .with_max_concurrent(1)
        .unwrap();
    let plan = planner
        .plan(h100_pcie(&catalog), llama_70b(&catalog), &target)
        .unwrap();

    assert!(plan.compute_bound_met);
    assert!(plan
        .e2e_latency_s
        .satisfies(|latency| latency <= target.max_latency));
}

#[test]
fn test_recommendation_for_reference_workload() {
    let catalog = Catalog::builtin();
    let target = PerformanceTarget::new(500.0, 10.0, 4096, 256, Precision::Fp16).unwrap();
    let recommendation = Recommender::default()
        .recommend_for(&catalog, "llama-3-70b", &target)
        .unwrap();

    assert_eq!(recommendation.model_name, "Llama-3-70B");
    assert_eq!(recommendation.concurrency, 20);
    assert_eq!(recommendation.plans.len(), 20);
    assert!(recommendation.skipped_gpus.is_empty());

    let best = recommendation.recommended().unwrap();
    let first_feasible = recommendation.feasible_plans().next().unwrap();
    assert_eq!(best, first_feasible);
    assert!(best.e2e_latency_s.satisfies(|l| l <= 10.0));
    assert!(best.throughput_tps.satisfies(|tps| tps >= 500.0));

    // Ranking is by fleet size first
    let sizes: Vec<u32> = recommendation.plans.iter().map(|p| p.fleet_size).collect();
    let mut sorted = sizes.clone();
    sorted.sort_unstable();
    assert_eq!(sizes, sorted);
}

#[test]
fn test_fp8_excludes_gpus_without_fp8() {
    let catalog = Catalog::builtin();
    let target = PerformanceTarget::new(500.0, 10.0, 4096, 256, Precision::Fp8).unwrap();
    let recommendation = Recommender::default()
        .recommend_for(&catalog, "Llama-3-70B", &target)
        .unwrap();

    assert_eq!(recommendation.plans.len(), 13);
    assert_eq!(recommendation.skipped_gpus.len(), 7);
    assert!(recommendation
        .plans
        .iter()
        .all(|p| !p.gpu_name.starts_with("A100")));
    assert!(recommendation
        .skipped_gpus
        .contains(&"A100 40 GB SXM".to_string()));
}

#[test]
fn test_no_viable_configuration_keeps_closest_candidate() {
    let catalog = Catalog::builtin();
    // 390,625 concurrent requests need terabytes of KV cache
    let target = PerformanceTarget::new(1e7, 10.0, 4096, 256, Precision::Fp16).unwrap();
    let recommendation = Recommender::default()
        .recommend_for(&catalog, "Llama-3-70B", &target)
        .unwrap();

    assert!(recommendation.recommended().is_none());
    assert_eq!(recommendation.feasible_plans().count(), 0);
    match &recommendation.outcome {
        Outcome::NoViableConfiguration {
            closest,
            suggestions,
        } => {
            let closest = closest.as_ref().unwrap();
            assert_eq!(closest, &recommendation.plans[0]);
            assert!(!closest.within_ceiling);
            assert_eq!(closest.binding, BindingConstraint::Memory);
            assert!(suggestions.iter().any(|s| s.contains("token rate")));
            assert!(suggestions.iter().any(|s| s.contains("fleet ceiling")));
        }
        other => panic!("expected NoViableConfiguration, got {:?}", other),
    }
}

#[test]
fn test_unknown_model() {
    let catalog = Catalog::builtin();
    let target = PerformanceTarget::new(500.0, 10.0, 4096, 256, Precision::Fp16).unwrap();
    let err = Recommender::default()
        .recommend_for(&catalog, "GPT-5", &target)
        .unwrap_err();

    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("Llama-3-70B"));
}

#[test]
fn test_parallel_and_sequential_agree() {
    let catalog = Catalog::builtin();
    let target = PerformanceTarget::new(2000.0, 5.0, 2048, 512, Precision::Bf16).unwrap();

    for model in catalog.model_names() {
        let parallel = Recommender::default()
            .recommend_for(&catalog, &model, &target)
            .unwrap();
        let sequential = Recommender::new(PlannerConfig {
            parallel: false,
            ..Default::default()
        })
        .recommend_for(&catalog, &model, &target)
        .unwrap();
        assert_eq!(parallel, sequential, "model {}", model);
    }
}

#[test]
fn test_sentinels_never_satisfy_targets() {
    assert!(!Metric::OutOfRange.satisfies(|v| v >= 0.0));
    assert!(!Metric::NotComputable.satisfies(|v| v >= 0.0));
    assert!(!Metric::Unsupported.satisfies(|v| v >= 0.0));
}
