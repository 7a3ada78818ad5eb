//! Path evolver: terminal prices of Heston paths at a fixed correlation.
//!
//! # Scheme
//!
//! Per step, with `Z1, Z2` independent standard normals:
//!
//! ```text
//! dW_V = Z1 * sqrt(dt)
//! dW_S = (rho * Z1 + sqrt(1 - rho^2) * Z2) * sqrt(dt)
//! V+   = floor.effective(V)
//! V'   = V + kappa * (theta - V) * dt + sigma * sqrt(V+) * dW_V
//! S'   = S * exp((r - V+ / 2) * dt + sqrt(V+) * dW_S)
//! V    = floor.carry(V')
//! ```
//!
//! The price update is log-Euler, so terminal prices are strictly positive
//! up to floating-point underflow.
//!
//! # Parallel layout
//!
//! [`simulate_batch_parallel`] splits the output into chunks of
//! [`PATHS_PER_TASK`] paths. Chunk `c` of stream `s` draws from
//! `PricerRng::for_stream(seed, chunk_stream(s, c))`, whichever thread runs it.

use pricer_models::models::{HestonParams, ModelError, VarianceFloor};
use rayon::prelude::*;

use crate::rng::{PricerRng, RandomSource};

/// Paths simulated per rayon task.
pub const PATHS_PER_TASK: usize = 4_096;

/// State of one path between steps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PricePath {
    /// Current asset price.
    pub spot: f64,
    /// Current variance, possibly negative under full truncation.
    pub variance: f64,
    /// Steps taken so far.
    pub step: usize,
}

impl PricePath {
    /// Path at `t = 0`.
    #[inline]
    pub fn start(params: &HestonParams) -> Self {
        Self {
            spot: params.spot(),
            variance: params.v0(),
            step: 0,
        }
    }
}

/// Per-step coefficients for one `(params, rho, floor)` combination.
#[derive(Clone, Copy, Debug)]
pub struct EulerStepper {
    rate: f64,
    kappa: f64,
    theta: f64,
    sigma: f64,
    dt: f64,
    sqrt_dt: f64,
    rho: f64,
    rho_bar: f64,
    n_steps: usize,
    floor: VarianceFloor,
}

impl EulerStepper {
    /// Precomputes the step coefficients. `rho` must lie in `[-1, 1]`.
    pub fn new(params: &HestonParams, rho: f64, floor: VarianceFloor) -> Self {
        let dt = params.dt();
        Self {
            rate: params.rate(),
            kappa: params.kappa(),
            theta: params.theta(),
            sigma: params.sigma(),
            dt,
            sqrt_dt: dt.sqrt(),
            rho,
            rho_bar: (1.0 - rho * rho).max(0.0).sqrt(),
            n_steps: params.n_steps(),
            floor,
        }
    }

    /// Advances `path` by one step using the normals `z1` (variance) and
    /// `z2` (independent price shock).
    #[inline]
    pub fn advance(&self, path: &mut PricePath, z1: f64, z2: f64) {
        let dw_v = z1 * self.sqrt_dt;
        let dw_s = (self.rho * z1 + self.rho_bar * z2) * self.sqrt_dt;

        let v = path.variance;
        let v_plus = self.floor.effective(v);
        let sqrt_v = v_plus.sqrt();

        let v_next = v + self.kappa * (self.theta - v) * self.dt + self.sigma * sqrt_v * dw_v;
        let s_next = path.spot * ((self.rate - 0.5 * v_plus) * self.dt + sqrt_v * dw_s).exp();

        path.spot = s_next;
        path.variance = self.floor.carry(v_next);
        path.step += 1;
    }

    /// Runs a full path from `start` and returns its terminal price.
    #[inline]
    pub fn terminal<R: RandomSource + ?Sized>(&self, start: PricePath, rng: &mut R) -> f64 {
        let mut path = start;
        for _ in 0..self.n_steps {
            let z1 = rng.standard_normal();
            let z2 = rng.standard_normal();
            self.advance(&mut path, z1, z2);
        }
        path.spot
    }
}

/// Checks the inputs of a batch.
pub(crate) fn validate_batch(params: &HestonParams, rho: f64, m: usize) -> Result<(), ModelError> {
    params.validate()?;
    if !rho.is_finite() || !(-1.0..=1.0).contains(&rho) {
        return Err(ModelError::invalid_parameter(
            "rho",
            format!("must lie in [-1, 1], got {}", rho),
        ));
    }
    if m < 1 {
        return Err(ModelError::invalid_parameter(
            "n_paths",
            format!("must be at least 1, got {}", m),
        ));
    }
    Ok(())
}

/// Writes one terminal price per slot of `out`, drawing from `rng`.
pub(crate) fn fill_terminal_prices<R: RandomSource + ?Sized>(
    stepper: &EulerStepper,
    start: PricePath,
    rng: &mut R,
    out: &mut [f64],
) {
    for slot in out.iter_mut() {
        *slot = stepper.terminal(start, rng);
    }
}

/// Stream identifier for chunk `chunk` of stream `stream`.
#[inline]
pub(crate) fn chunk_stream(stream: u64, chunk: usize) -> u64 {
    (stream << 32) | (chunk as u64 & 0xFFFF_FFFF)
}

/// Fills `out` chunk by chunk, each chunk from its own generator.
///
/// The output is identical for `parallel = true` and `parallel = false`.
pub(crate) fn fill_terminal_prices_chunked(
    stepper: &EulerStepper,
    start: PricePath,
    seed: u64,
    stream: u64,
    parallel: bool,
    out: &mut [f64],
) {
    let run = |(chunk, slice): (usize, &mut [f64])| {
        let mut rng = PricerRng::for_stream(seed, chunk_stream(stream, chunk));
        fill_terminal_prices(stepper, start, &mut rng, slice);
    };

    if parallel {
        out.par_chunks_mut(PATHS_PER_TASK).enumerate().for_each(run);
    } else {
        out.chunks_mut(PATHS_PER_TASK).enumerate().for_each(run);
    }
}

/// Simulates `m` independent paths at correlation `rho` and returns their
/// terminal prices.
///
/// # Errors
///
/// `ModelError::InvalidParameter` if `params` is invalid, `rho` is outside
/// `[-1, 1]` or `m == 0`. Nothing is drawn from `rng` on error.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::{HestonParams, VarianceFloor};
/// use pricer_pricing::mc::simulate_batch;
/// use pricer_pricing::rng::PricerRng;
///
/// let params = HestonParams::default();
/// let mut rng = PricerRng::from_seed(42);
///
/// let terminals = simulate_batch(&params, -0.7, 1_000, VarianceFloor::default(), &mut rng).unwrap();
/// assert_eq!(terminals.len(), 1_000);
/// assert!(terminals.iter().all(|&s| s >= 0.0));
/// ```
pub fn simulate_batch<R: RandomSource + ?Sized>(
    params: &HestonParams,
    rho: f64,
    m: usize,
    floor: VarianceFloor,
    rng: &mut R,
) -> Result<Vec<f64>, ModelError> {
    validate_batch(params, rho, m)?;

    let stepper = EulerStepper::new(params, rho, floor);
    let mut terminals = vec![0.0; m];
    fill_terminal_prices(&stepper, PricePath::start(params), rng, &mut terminals);
    Ok(terminals)
}

/// Parallel variant of [`simulate_batch`] driven by `(seed, stream)`.
///
/// The result depends only on the arguments, not on the size of the rayon
/// pool.
///
/// # Errors
///
/// Same as [`simulate_batch`].
pub fn simulate_batch_parallel(
    params: &HestonParams,
    rho: f64,
    m: usize,
    floor: VarianceFloor,
    seed: u64,
    stream: u64,
) -> Result<Vec<f64>, ModelError> {
    validate_batch(params, rho, m)?;

    let stepper = EulerStepper::new(params, rho, floor);
    let mut terminals = vec![0.0; m];
    fill_terminal_prices_chunked(
        &stepper,
        PricePath::start(params),
        seed,
        stream,
        true,
        &mut terminals,
    );
    Ok(terminals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Replays a fixed sequence of normals.
    struct Replay {
        normals: Vec<f64>,
        pos: usize,
    }

    impl RandomSource for Replay {
        fn uniform(&mut self) -> f64 {
            0.5
        }

        fn standard_normal(&mut self) -> f64 {
            let z = self.normals[self.pos % self.normals.len()];
            self.pos += 1;
            z
        }
    }

    fn params(n_steps: usize) -> HestonParams {
        HestonParams::builder().n_steps(n_steps).build().unwrap()
    }

    #[test]
    fn test_single_step_matches_scheme() {
        let p = params(4);
        let stepper = EulerStepper::new(&p, -0.5, VarianceFloor::FullTruncation);
        let mut path = PricePath::start(&p);
        stepper.advance(&mut path, 1.0, -1.0);

        let dt: f64 = 0.25;
        let v0: f64 = 0.010201;
        let dw_v = dt.sqrt();
        let dw_s = (-0.5 + 0.75_f64.sqrt() * -1.0) * dt.sqrt();
        let v1 = v0 + 6.21 * (0.019 - v0) * dt + 0.61 * v0.sqrt() * dw_v;
        let s1 = 2.0 * ((0.0319 - 0.5 * v0) * dt + v0.sqrt() * dw_s).exp();

        assert_relative_eq!(path.variance, v1, epsilon = 1e-15);
        assert_relative_eq!(path.spot, s1, epsilon = 1e-15);
        assert_eq!(path.step, 1);
    }

    #[test]
    fn test_full_truncation_keeps_negative_state() {
        let p = HestonParams::builder()
            .v0(0.0001)
            .kappa(0.0)
            .sigma(2.0)
            .n_steps(1)
            .build()
            .unwrap();
        let stepper = EulerStepper::new(&p, 0.0, VarianceFloor::FullTruncation);
        let mut path = PricePath::start(&p);
        stepper.advance(&mut path, -5.0, 0.0);
        assert!(path.variance < 0.0);

        // Next step diffuses with zero variance: the price moves by drift only.
        let before = path.spot;
        stepper.advance(&mut path, 3.0, 3.0);
        assert_relative_eq!(path.spot, before * (p.rate() * p.dt()).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_absorption_clamps_state() {
        let p = HestonParams::builder()
            .v0(0.0001)
            .kappa(0.0)
            .sigma(2.0)
            .n_steps(1)
            .build()
            .unwrap();
        let stepper = EulerStepper::new(&p, 0.0, VarianceFloor::Absorption);
        let mut path = PricePath::start(&p);
        stepper.advance(&mut path, -5.0, 0.0);
        assert_eq!(path.variance, 0.0);
    }

    #[test]
    fn test_reflection_mirrors_state() {
        let p = HestonParams::builder()
            .v0(0.0001)
            .kappa(0.0)
            .sigma(2.0)
            .n_steps(1)
            .build()
            .unwrap();
        let raw = {
            let stepper = EulerStepper::new(&p, 0.0, VarianceFloor::FullTruncation);
            let mut path = PricePath::start(&p);
            stepper.advance(&mut path, -5.0, 0.0);
            path.variance
        };
        let stepper = EulerStepper::new(&p, 0.0, VarianceFloor::Reflection);
        let mut path = PricePath::start(&p);
        stepper.advance(&mut path, -5.0, 0.0);
        assert_relative_eq!(path.variance, raw.abs(), epsilon = 1e-15);
    }

    #[test]
    fn test_perfect_correlation_uses_only_z1() {
        let p = params(1);
        let stepper = EulerStepper::new(&p, 1.0, VarianceFloor::FullTruncation);

        let mut a = PricePath::start(&p);
        let mut b = PricePath::start(&p);
        stepper.advance(&mut a, 0.3, -2.0);
        stepper.advance(&mut b, 0.3, 2.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_batch_length_and_positivity() {
        let mut rng = PricerRng::from_seed(1);
        let out = simulate_batch(&params(50), -0.9, 257, VarianceFloor::default(), &mut rng).unwrap();
        assert_eq!(out.len(), 257);
        assert!(out.iter().all(|&s| s >= 0.0 && s.is_finite()));
    }

    #[test]
    fn test_batch_consumes_two_normals_per_step() {
        let p = params(3);
        let mut replay = Replay {
            normals: vec![0.1, -0.2, 0.3, 0.4, -0.5, 0.6],
            pos: 0,
        };
        simulate_batch(&p, -0.5, 2, VarianceFloor::default(), &mut replay).unwrap();
        assert_eq!(replay.pos, 2 * 3 * 2);
    }

    #[test]
    fn test_zero_shocks_follow_deterministic_drift() {
        let p = HestonParams::builder()
            .v0(0.019)
            .theta(0.019)
            .n_steps(10)
            .build()
            .unwrap();
        let mut replay = Replay {
            normals: vec![0.0],
            pos: 0,
        };
        let out = simulate_batch(&p, -0.7, 1, VarianceFloor::default(), &mut replay).unwrap();
        let expected = 2.0 * ((0.0319 - 0.5 * 0.019) * 1.0_f64).exp();
        assert_relative_eq!(out[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut rng = PricerRng::from_seed(1);
        let p = params(10);

        let err = simulate_batch(&p, 1.2, 10, VarianceFloor::default(), &mut rng).unwrap_err();
        assert_eq!(err.parameter_name(), Some("rho"));

        let err = simulate_batch(&p, -0.5, 0, VarianceFloor::default(), &mut rng).unwrap_err();
        assert_eq!(err.parameter_name(), Some("n_paths"));

        let err = simulate_batch_parallel(&p, f64::NAN, 10, VarianceFloor::default(), 0, 0)
            .unwrap_err();
        assert_eq!(err.parameter_name(), Some("rho"));
    }

    #[test]
    fn test_parallel_matches_chunked_sequential() {
        let p = params(20);
        let m = PATHS_PER_TASK * 2 + 17;
        let stepper = EulerStepper::new(&p, -0.5, VarianceFloor::default());

        let parallel = simulate_batch_parallel(&p, -0.5, m, VarianceFloor::default(), 9, 3).unwrap();

        let mut sequential = vec![0.0; m];
        fill_terminal_prices_chunked(&stepper, PricePath::start(&p), 9, 3, false, &mut sequential);

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_chunk_streams_do_not_collide() {
        assert_ne!(chunk_stream(0, 1), chunk_stream(1, 0));
        assert_eq!(chunk_stream(2, 5), (2 << 32) | 5);
    }
}
