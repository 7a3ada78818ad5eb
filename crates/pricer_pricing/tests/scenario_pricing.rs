//! End-to-end tests for the Heston scenario pricer.
//!
//! # Test Categories
//!
//! 1. **Reproducibility**: fixed seeds, sequential vs parallel execution
//! 2. **Sample properties**: non-negativity, pooling, standard error scaling
//! 3. **Validation**: parameter and distribution errors, minimal runs
//! 4. **Analytical limits**: Black-Scholes reduction, deep out-of-the-money
//! 5. **Reference run**: the reference parameter set lands in a sanity range

use pricer_models::analytical::BlackScholes;
use pricer_models::models::{CorrelationDistribution, HestonParams, ModelError, VarianceFloor};
use pricer_pricing::mc::{
    price_with_source, simulate_batch, CancellationToken, ScenarioPricer, SimulationConfig,
    SimulationError, PATHS_PER_TASK,
};
use pricer_pricing::rng::PricerRng;
use proptest::prelude::*;

fn reference_distribution() -> CorrelationDistribution {
    CorrelationDistribution::new(vec![-0.5, -0.7, -0.9], vec![0.25, 0.5, 0.25]).unwrap()
}

fn coarse_params() -> HestonParams {
    HestonParams::builder().n_steps(50).build().unwrap()
}

fn pricer(n_paths: usize, n_scenarios: usize, seed: u64) -> ScenarioPricer {
    let config = SimulationConfig::builder()
        .n_paths(n_paths)
        .n_scenarios(n_scenarios)
        .seed(seed)
        .keep_samples(true)
        .build()
        .unwrap();
    ScenarioPricer::new(config)
}

// ============================================================================
// Reproducibility
// ============================================================================

#[test]
fn test_same_seed_same_result() {
    let params = coarse_params();
    let dist = reference_distribution();

    let a = pricer(2_000, 3, 42).price(&params, &dist).unwrap();
    let b = pricer(2_000, 3, 42).price(&params, &dist).unwrap();

    assert_eq!(a.option_price, b.option_price);
    assert_eq!(a.standard_error, b.standard_error);
    assert_eq!(a.draws, b.draws);
    assert_eq!(a.payoffs, b.payoffs);
}

#[test]
fn test_different_seed_different_result() {
    let params = coarse_params();
    let dist = reference_distribution();

    let a = pricer(2_000, 3, 1).price(&params, &dist).unwrap();
    let b = pricer(2_000, 3, 2).price(&params, &dist).unwrap();

    assert_ne!(a.payoffs, b.payoffs);
}

#[test]
fn test_parallel_matches_sequential_bit_for_bit() {
    let params = HestonParams::builder().n_steps(10).build().unwrap();
    let dist = reference_distribution();
    let m = PATHS_PER_TASK + 904;

    let build = |parallel: bool| {
        SimulationConfig::builder()
            .n_paths(m)
            .n_scenarios(3)
            .seed(2024)
            .parallel(parallel)
            .keep_samples(true)
            .build()
            .unwrap()
    };

    let parallel = ScenarioPricer::new(build(true)).price(&params, &dist).unwrap();
    let sequential = ScenarioPricer::new(build(false)).price(&params, &dist).unwrap();

    assert_eq!(parallel.option_price, sequential.option_price);
    assert_eq!(parallel.standard_error, sequential.standard_error);
    assert_eq!(parallel.draws, sequential.draws);
    assert_eq!(parallel.terminal_prices, sequential.terminal_prices);
}

#[test]
fn test_injected_source_is_reproducible() {
    let params = coarse_params();
    let dist = reference_distribution();

    let run = || {
        let mut rng = PricerRng::from_seed(99);
        price_with_source(&params, &dist, 500, 4, VarianceFloor::default(), &mut rng).unwrap()
    };

    let (a, b) = (run(), run());
    assert_eq!(a.payoffs, b.payoffs);
    assert_eq!(a.draws, b.draws);
}

// ============================================================================
// Sample properties
// ============================================================================

#[test]
fn test_terminal_prices_and_payoffs_non_negative() {
    let params = coarse_params();
    let dist = reference_distribution();

    for floor in [
        VarianceFloor::FullTruncation,
        VarianceFloor::Reflection,
        VarianceFloor::Absorption,
    ] {
        let config = SimulationConfig::builder()
            .n_paths(2_000)
            .n_scenarios(2)
            .variance_floor(floor)
            .keep_samples(true)
            .build()
            .unwrap();
        let result = ScenarioPricer::new(config).price(&params, &dist).unwrap();

        let terminals = result.terminal_prices.as_ref().unwrap();
        let payoffs = result.payoffs.as_ref().unwrap();
        assert!(
            terminals.iter().all(|&s| s >= 0.0 && s.is_finite()),
            "negative or non-finite terminal price under {}",
            floor
        );
        assert!(payoffs.iter().all(|&x| x >= 0.0), "negative payoff under {}", floor);
        assert!(result.option_price >= 0.0);
    }
}

#[test]
fn test_pooling_three_scenarios() {
    let params = coarse_params();
    let dist = reference_distribution();

    let result = pricer(1_000, 3, 5).price(&params, &dist).unwrap();

    assert_eq!(result.sample_count, 3_000);
    assert_eq!(result.payoffs.as_ref().map(Vec::len), Some(3_000));
    assert_eq!(result.terminal_prices.as_ref().map(Vec::len), Some(3_000));
    assert_eq!(result.draws.len(), 3);
    for (i, draw) in result.draws.iter().enumerate() {
        assert_eq!(draw.scenario, i);
        assert!(dist.values().contains(&draw.rho), "rho {} not in support", draw.rho);
    }
}

#[test]
fn test_standard_error_shrinks_with_sample_count() {
    let params = coarse_params();
    let dist = reference_distribution();
    let seeds = 100..108u64;

    let mean_error = |n_paths: usize| {
        let total: f64 = seeds
            .clone()
            .map(|seed| {
                pricer(n_paths, 4, seed)
                    .price(&params, &dist)
                    .unwrap()
                    .standard_error
            })
            .sum();
        total / seeds.clone().count() as f64
    };

    let small = mean_error(250);
    let large = mean_error(4_000);

    // Sixteen times the samples: about a quarter of the error.
    let ratio = small / large;
    assert!(
        (3.4..4.6).contains(&ratio),
        "mean SE ratio {:.3} (small={:.5}, large={:.5})",
        ratio,
        small,
        large
    );
}

#[test]
fn test_price_is_discounted_payoff() {
    let params = coarse_params();
    let result = pricer(1_000, 2, 8)
        .price(&params, &reference_distribution())
        .unwrap();

    let expected = (-params.rate() * params.maturity()).exp() * result.expected_payoff;
    assert!((result.option_price - expected).abs() < 1e-15);
    assert!(
        (result.price_standard_error() - result.standard_error * params.discount_factor()).abs()
            < 1e-15
    );
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_probabilities_must_sum_to_one() {
    let err = CorrelationDistribution::new(vec![-0.5, -0.7, -0.9], vec![0.3, 0.3, 0.3])
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidDistribution { .. }));

    assert!(CorrelationDistribution::new(vec![-0.5, -0.7, -0.9], vec![0.25, 0.5, 0.25]).is_ok());
}

#[test]
fn test_zero_steps_rejected() {
    let err = HestonParams::builder().n_steps(0).build().unwrap_err();
    assert_eq!(err.parameter_name(), Some("n_steps"));
}

#[test]
fn test_minimal_run() {
    let params = HestonParams::builder()
        .n_steps(1)
        .maturity(1.0)
        .build()
        .unwrap();
    let result = pricer(1, 1, 0)
        .price(&params, &reference_distribution())
        .unwrap();

    assert_eq!(result.sample_count, 1);
    assert_eq!(result.standard_error, 0.0);
    assert!(result.option_price.is_finite() && result.option_price >= 0.0);
}

#[test]
fn test_invalid_sizes_rejected_by_injected_entry_point() {
    let params = coarse_params();
    let dist = reference_distribution();
    let mut rng = PricerRng::from_seed(0);

    let err = price_with_source(&params, &dist, 0, 1, VarianceFloor::default(), &mut rng)
        .unwrap_err();
    assert!(matches!(err, SimulationError::Model(ModelError::InvalidParameter { .. })));

    let err = price_with_source(&params, &dist, 1, 0, VarianceFloor::default(), &mut rng)
        .unwrap_err();
    assert_eq!(
        err.as_model_error().and_then(ModelError::parameter_name),
        Some("n_scenarios")
    );
}

#[test]
fn test_rho_outside_unit_interval_rejected() {
    let mut rng = PricerRng::from_seed(0);
    let err = simulate_batch(&coarse_params(), -1.01, 10, VarianceFloor::default(), &mut rng)
        .unwrap_err();
    assert_eq!(err.parameter_name(), Some("rho"));

    let err = CorrelationDistribution::new(vec![1.5], vec![1.0]).unwrap_err();
    assert_eq!(err.parameter_name(), Some("rho"));
}

#[test]
fn test_cancelled_run() {
    let token = CancellationToken::new();
    token.cancel();

    let err = pricer(1_000, 3, 0)
        .price_cancellable(&coarse_params(), &reference_distribution(), &token)
        .unwrap_err();
    assert_eq!(err, SimulationError::Cancelled);
}

// ============================================================================
// Analytical limits
// ============================================================================

#[test]
fn test_constant_variance_reduces_to_black_scholes() {
    let params = HestonParams::builder()
        .v0(0.04)
        .theta(0.04)
        .sigma(0.0)
        .n_steps(20)
        .build()
        .unwrap();
    let bs = BlackScholes::from_degenerate_heston(&params).unwrap();
    let analytical = bs.price_call(params.strike(), params.maturity());

    let result = pricer(10_000, 4, 42)
        .price(&params, &reference_distribution())
        .unwrap();

    let tolerance = 4.0 * result.price_standard_error();
    let error = (result.option_price - analytical).abs();
    assert!(
        error < tolerance,
        "MC={:.5}, Black-Scholes={:.5}, Error={:.5}, Tolerance={:.5}",
        result.option_price,
        analytical,
        error,
        tolerance
    );
}

#[test]
fn test_deep_out_of_the_money_is_worthless() {
    let params = HestonParams::builder()
        .strike(200.0)
        .n_steps(50)
        .build()
        .unwrap();
    let result = pricer(5_000, 2, 3)
        .price(&params, &reference_distribution())
        .unwrap();

    assert_eq!(result.expected_payoff, 0.0);
    assert_eq!(result.option_price, 0.0);
    assert_eq!(result.standard_error, 0.0);
}

// ============================================================================
// Reference run
// ============================================================================

#[test]
fn test_reference_run_sanity_range() {
    let params = HestonParams::default();
    let result = pricer(4_000, 4, 2024)
        .price(&params, &reference_distribution())
        .unwrap();

    assert_eq!(result.sample_count, 16_000);
    assert!(
        (0.120..0.160).contains(&result.expected_payoff),
        "expected payoff {:.4}",
        result.expected_payoff
    );
    assert!(
        (0.115..0.155).contains(&result.option_price),
        "option price {:.4}",
        result.option_price
    );
    assert!(result.standard_error > 0.0 && result.standard_error < 0.005);
    assert!((result.expected_terminal_price - 2.0 * 0.0319_f64.exp()).abs() < 0.02);
}

// ============================================================================
// Property-based tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_batch_terminals_non_negative(
        seed in any::<u64>(),
        rho in -1.0f64..=1.0,
        sigma in 0.0f64..2.0,
    ) {
        let params = HestonParams::builder()
            .sigma(sigma)
            .n_steps(25)
            .build()
            .unwrap();
        let mut rng = PricerRng::from_seed(seed);
        let terminals = simulate_batch(&params, rho, 200, VarianceFloor::default(), &mut rng).unwrap();

        prop_assert_eq!(terminals.len(), 200);
        prop_assert!(terminals.iter().all(|&s| s >= 0.0 && s.is_finite()));
    }
}
