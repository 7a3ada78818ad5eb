//! Scenario aggregator: pooled pricing across correlation scenarios.
//!
//! A run consists of `p` scenarios. Each scenario draws one correlation from
//! the [`CorrelationDistribution`], simulates `m` paths at that correlation,
//! and writes the terminal prices into its own `m`-slot range of a pooled
//! buffer. The `m * p` payoffs are then averaged, discounted and summarised.

use std::time::Instant;

use pricer_models::models::{CorrelationDistribution, HestonParams, VarianceFloor};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::cancel::CancellationToken;
use super::config::{validate_run_size, SimulationConfig};
use super::error::SimulationError;
use super::evolver::{
    chunk_stream, fill_terminal_prices, EulerStepper, PricePath, PATHS_PER_TASK,
};
use super::payoff::PayoffType;
use super::result::{histogram_mode, mean_and_std, ScenarioDraw, SimulationResult, MODE_BIN_WIDTH};
use crate::rng::{PricerRng, RandomSource};

/// Prices a European call with `p` scenarios of `m` paths, drawing every
/// random number from `rng`.
///
/// Scenario `s` consumes one uniform for its correlation draw, then the
/// normals of its `m` paths. Raw payoffs and terminal prices are kept in the
/// result.
///
/// # Errors
///
/// `SimulationError::Model` when `params` is invalid or `m`, `p` is zero.
/// Validation happens before any draw from `rng`.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::{CorrelationDistribution, HestonParams, VarianceFloor};
/// use pricer_pricing::mc::price_with_source;
/// use pricer_pricing::rng::PricerRng;
///
/// let params = HestonParams::builder().n_steps(50).build().unwrap();
/// let dist = CorrelationDistribution::new(vec![-0.5, -0.7, -0.9], vec![0.25, 0.5, 0.25]).unwrap();
/// let mut rng = PricerRng::from_seed(42);
///
/// let result = price_with_source(&params, &dist, 500, 3, VarianceFloor::default(), &mut rng).unwrap();
/// assert_eq!(result.sample_count, 1_500);
/// assert_eq!(result.draws.len(), 3);
/// assert_eq!(result.payoffs.as_ref().map(Vec::len), Some(1_500));
/// ```
pub fn price_with_source<R: RandomSource + ?Sized>(
    params: &HestonParams,
    distribution: &CorrelationDistribution,
    m: usize,
    p: usize,
    floor: VarianceFloor,
    rng: &mut R,
) -> Result<SimulationResult, SimulationError> {
    let started = Instant::now();
    params.validate()?;
    let total = validate_run_size(m, p)?;
    log_feller(params);

    let start = PricePath::start(params);
    let mut terminals = vec![0.0; total];
    let mut draws = Vec::with_capacity(p);

    for (scenario, slice) in terminals.chunks_mut(m).enumerate() {
        let draw = draw_scenario(distribution, scenario, rng);
        let stepper = EulerStepper::new(params, draw.rho, floor);
        fill_terminal_prices(&stepper, start, rng, slice);
        draws.push(draw);
    }

    Ok(summarise(
        params,
        PayoffType::Call,
        terminals,
        draws,
        true,
        started,
    ))
}

/// Engine entry point configured by a [`SimulationConfig`].
///
/// All scenario correlations come from a master stream seeded with
/// `config.seed()`. Paths come from per-chunk streams keyed by scenario and
/// chunk, so sequential and parallel runs with the same seed return
/// bit-identical results.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::{CorrelationDistribution, HestonParams};
/// use pricer_pricing::mc::{ScenarioPricer, SimulationConfig};
///
/// let params = HestonParams::builder().n_steps(50).build().unwrap();
/// let dist = CorrelationDistribution::new(vec![-0.5, -0.7, -0.9], vec![0.25, 0.5, 0.25]).unwrap();
///
/// let config = SimulationConfig::builder()
///     .n_paths(1_000)
///     .n_scenarios(4)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let result = ScenarioPricer::new(config).price(&params, &dist).unwrap();
/// assert!(result.option_price > 0.0);
/// assert!(result.standard_error > 0.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScenarioPricer {
    config: SimulationConfig,
}

impl ScenarioPricer {
    /// Creates a pricer for a validated configuration.
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Returns the run configuration.
    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Prices the option.
    ///
    /// # Errors
    ///
    /// `SimulationError::Model` when `params` or the configured sizes are invalid.
    pub fn price(
        &self,
        params: &HestonParams,
        distribution: &CorrelationDistribution,
    ) -> Result<SimulationResult, SimulationError> {
        self.price_cancellable(params, distribution, &CancellationToken::new())
    }

    /// Prices the option, checking `token` before each chunk of paths and
    /// therefore at the start of every scenario.
    ///
    /// All chunks of all scenarios form one job list, run on the rayon pool
    /// when `parallel` is set.
    ///
    /// # Errors
    ///
    /// - `SimulationError::Model` when `params` or the configured sizes are invalid
    /// - `SimulationError::Cancelled` when `token` is cancelled before the last
    ///   chunk starts
    pub fn price_cancellable(
        &self,
        params: &HestonParams,
        distribution: &CorrelationDistribution,
        token: &CancellationToken,
    ) -> Result<SimulationResult, SimulationError> {
        let started = Instant::now();
        let config = &self.config;
        params.validate()?;
        let m = config.n_paths();
        let p = config.n_scenarios();
        let total = validate_run_size(m, p)?;

        info!(
            n_paths = m,
            n_scenarios = p,
            n_steps = params.n_steps(),
            seed = config.seed(),
            parallel = config.parallel(),
            floor = %config.variance_floor(),
            "Starting Heston Monte Carlo run"
        );
        log_feller(params);

        let mut master = PricerRng::from_seed(config.seed());
        let draws: Vec<ScenarioDraw> = (0..p)
            .map(|scenario| draw_scenario(distribution, scenario, &mut master))
            .collect();

        let start = PricePath::start(params);
        let seed = config.seed();
        let mut terminals = vec![0.0; total];
        let tasks = chunk_tasks(params, &draws, config.variance_floor(), &mut terminals, m);
        debug!(tasks = tasks.len(), "Planned path chunks");

        let run = |task: ChunkTask<'_>| -> Result<(), SimulationError> {
            if token.is_cancelled() {
                return Err(SimulationError::Cancelled);
            }
            let stream = chunk_stream(task.scenario as u64, task.chunk);
            let mut rng = PricerRng::for_stream(seed, stream);
            fill_terminal_prices(&task.stepper, start, &mut rng, task.out);
            Ok(())
        };

        let outcome = if config.parallel() {
            tasks.into_par_iter().try_for_each(run)
        } else {
            tasks.into_iter().try_for_each(run)
        };
        if let Err(err) = outcome {
            info!("Heston Monte Carlo run cancelled");
            return Err(err);
        }

        let result = summarise(
            params,
            config.payoff(),
            terminals,
            draws,
            config.keep_samples(),
            started,
        );

        info!(
            option_price = result.option_price,
            standard_error = result.standard_error,
            sample_count = result.sample_count,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Heston Monte Carlo run finished"
        );

        Ok(result)
    }
}

/// One unit of work: up to [`PATHS_PER_TASK`] paths of one scenario.
struct ChunkTask<'a> {
    scenario: usize,
    chunk: usize,
    stepper: EulerStepper,
    out: &'a mut [f64],
}

/// Splits the pooled buffer into per-scenario ranges of `m` slots, then each
/// range into chunks. Chunk numbering restarts at zero in every scenario.
fn chunk_tasks<'a>(
    params: &HestonParams,
    draws: &[ScenarioDraw],
    floor: VarianceFloor,
    terminals: &'a mut [f64],
    m: usize,
) -> Vec<ChunkTask<'a>> {
    let mut tasks = Vec::with_capacity(draws.len() * m.div_ceil(PATHS_PER_TASK));
    for (draw, range) in draws.iter().zip(terminals.chunks_mut(m)) {
        let stepper = EulerStepper::new(params, draw.rho, floor);
        for (chunk, out) in range.chunks_mut(PATHS_PER_TASK).enumerate() {
            tasks.push(ChunkTask {
                scenario: draw.scenario,
                chunk,
                stepper,
                out,
            });
        }
    }
    tasks
}

fn draw_scenario<R: RandomSource + ?Sized>(
    distribution: &CorrelationDistribution,
    scenario: usize,
    rng: &mut R,
) -> ScenarioDraw {
    let index = distribution.sample_index(rng.uniform());
    let rho = distribution.value(index);
    debug!(scenario, index, rho, "Drew scenario correlation");
    ScenarioDraw {
        scenario,
        index,
        rho,
    }
}

fn log_feller(params: &HestonParams) {
    if !params.satisfies_feller() {
        warn!(
            feller_ratio = params.feller_ratio(),
            "Feller condition violated; variance floor will be active"
        );
    }
}

/// Turns pooled terminal prices into a [`SimulationResult`].
fn summarise(
    params: &HestonParams,
    payoff: PayoffType,
    terminals: Vec<f64>,
    draws: Vec<ScenarioDraw>,
    keep_samples: bool,
    started: Instant,
) -> SimulationResult {
    let strike = params.strike();
    let payoffs: Vec<f64> = terminals
        .iter()
        .map(|&s| payoff.evaluate(s, strike))
        .collect();

    let n = payoffs.len();
    let sqrt_n = (n as f64).sqrt();
    let (expected_payoff, payoff_std_dev) = mean_and_std(&payoffs);
    let (expected_terminal_price, terminal_std_dev) = mean_and_std(&terminals);
    let payoff_mode = histogram_mode(&payoffs, MODE_BIN_WIDTH);
    let price_mode = histogram_mode(&terminals, MODE_BIN_WIDTH);
    let discount_factor = params.discount_factor();

    let (payoffs, terminal_prices) = if keep_samples {
        (Some(payoffs), Some(terminals))
    } else {
        (None, None)
    };

    SimulationResult {
        expected_payoff,
        option_price: discount_factor * expected_payoff,
        standard_error: payoff_std_dev / sqrt_n,
        payoff_std_dev,
        payoff_mode,
        expected_terminal_price,
        terminal_std_dev,
        terminal_std_error: terminal_std_dev / sqrt_n,
        price_mode,
        discount_factor,
        sample_count: n,
        n_steps: params.n_steps(),
        elapsed: started.elapsed(),
        draws,
        payoffs,
        terminal_prices,
    }
}
