//! Property tests for the performance model and the planner

use gpuplan_planner::perf_model::{
    kv_cache_gib_per_token, max_kv_cache_tokens, memory_footprint_gb, time_per_output_token,
};
use gpuplan_planner::{
    CapacityPlanner, Catalog, ModelSpec, PerformanceTarget, PlannerConfig, Precision, Recommender,
};
use proptest::prelude::*;

fn arb_precision() -> impl Strategy<Value = Precision> {
    prop::sample::select(Precision::ALL.to_vec())
}

fn arb_model() -> impl Strategy<Value = ModelSpec> {
    (1.0f64..700.0, 1u32..200, 512u32..20_000)
        .prop_map(|(params, layers, d_model)| ModelSpec::new("arb", params, d_model, layers, 8192))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_kv_cache_scales_with_precision(
        layers in 1u32..200,
        d_model in 1u32..20_000,
        precision in arb_precision(),
    ) {
        let kv = kv_cache_gib_per_token(layers, d_model, precision.bytes_per_param());
        let one_byte = kv_cache_gib_per_token(layers, d_model, 1);
        prop_assert!(kv > 0.0);
        prop_assert!((kv - one_byte * precision.bytes_per_param() as f64).abs() <= kv * 1e-12);
    }

    #[test]
    fn prop_footprint_monotonic_in_concurrency(
        model in arb_model(),
        concurrency in 1u64..1000,
        context in 1u64..100_000,
    ) {
        let lower = memory_footprint_gb(&model, concurrency, context, 2);
        let higher = memory_footprint_gb(&model, concurrency + 1, context, 2);
        prop_assert!(higher > lower);
    }

    #[test]
    fn prop_max_kv_tokens_never_negative(
        fleet in 0u32..64,
        memory in 1.0f64..200.0,
        params in 1.0f64..700.0,
        precision in arb_precision(),
    ) {
        let bytes = precision.bytes_per_param();
        let kv = kv_cache_gib_per_token(80, 8192, bytes);
        prop_assert!(max_kv_cache_tokens(fleet, memory, params, kv, bytes) >= 0.0);
    }

    #[test]
    fn prop_tpot_decreases_with_fleet(
        fleet in 1u32..128,
        params in 1.0f64..700.0,
        bandwidth in 100.0f64..10_000.0,
    ) {
        let smaller = time_per_output_token(fleet, params, bandwidth).value().unwrap();
        let larger = time_per_output_token(fleet + 1, params, bandwidth).value().unwrap();
        prop_assert!(larger < smaller);
    }

    // Concurrency is explicit here; derived concurrency grows with the budget
    #[test]
    fn prop_fleet_never_grows_with_latency_budget(
        latency in 0.01f64..60.0,
        extra in 0.0f64..60.0,
        concurrency in 1u32..64,
        prompt in 0u32..16_384,
    ) {
        let catalog = Catalog::builtin();
        let gpu = catalog.find_gpu("H100 SXM").unwrap();
        let model = catalog.find_model("Llama-3-70B").unwrap();
        let planner = CapacityPlanner::default();

        let tight = PerformanceTarget::new(100.0, latency, prompt, 256, Precision::Fp16)
            .unwrap()
            .with_max_concurrent(concurrency)
            .unwrap();
        let loose = PerformanceTarget::new(100.0, latency + extra, prompt, 256, Precision::Fp16)
            .unwrap()
            .with_max_concurrent(concurrency)
            .unwrap();

        let tight_plan = planner.plan(gpu, model, &tight).unwrap();
        let loose_plan = planner.plan(gpu, model, &loose).unwrap();
        prop_assert!(loose_plan.fleet_size <= tight_plan.fleet_size);
    }

    #[test]
    fn prop_fleet_never_shrinks_with_token_rate(
        rate in 1.0f64..5_000.0,
        extra in 0.0f64..5_000.0,
        latency in 0.5f64..30.0,
    ) {
        let catalog = Catalog::builtin();
        let gpu = catalog.find_gpu("H200 SXM").unwrap();
        let model = catalog.find_model("Llama-3.1-70B").unwrap();
        let planner = CapacityPlanner::default();

        let low = PerformanceTarget::new(rate, latency, 2048, 256, Precision::Fp16).unwrap();
        let high = PerformanceTarget::new(rate + extra, latency, 2048, 256, Precision::Fp16).unwrap();

        let low_plan = planner.plan(gpu, model, &low).unwrap();
        let high_plan = planner.plan(gpu, model, &high).unwrap();
        prop_assert!(high_plan.fleet_size >= low_plan.fleet_size);
    }

    #[test]
    fn prop_recommendation_is_deterministic(
        rate in 10.0f64..10_000.0,
        latency in 0.1f64..30.0,
        precision in arb_precision(),
    ) {
        let catalog = Catalog::builtin();
        let target = PerformanceTarget::new(rate, latency, 1024, 256, precision).unwrap();
        let sequential = Recommender::new(PlannerConfig { parallel: false, ..Default::default() });

        let first = Recommender::default()
            .recommend_for(&catalog, "Mistral-7B-v0.3", &target)
            .unwrap();
        let second = sequential
            .recommend_for(&catalog, "Mistral-7B-v0.3", &target)
            .unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_feasible_plans_meet_both_targets(
        rate in 10.0f64..10_000.0,
        latency in 0.1f64..30.0,
    ) {
        let catalog = Catalog::builtin();
        let target = PerformanceTarget::new(rate, latency, 1024, 256, Precision::Fp16).unwrap();
        let recommendation = Recommender::default()
            .recommend_for(&catalog, "Llama-3-8B", &target)
            .unwrap();

        for plan in recommendation.feasible_plans() {
            prop_assert!(plan.e2e_latency_s.satisfies(|l| l <= latency));
            prop_assert!(plan.throughput_tps.satisfies(|tps| tps >= rate));
            prop_assert!(plan.fleet_size <= 128);
        }
    }
}
