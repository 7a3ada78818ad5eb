//! Output of a pricing run.

use std::collections::BTreeMap;
use std::time::Duration;

/// Histogram bin width used for the reported price and payoff modes.
pub const MODE_BIN_WIDTH: f64 = 0.02;

/// Correlation drawn for one scenario.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioDraw {
    /// Scenario number, `0..p`.
    pub scenario: usize,
    /// Support index selected in the correlation distribution.
    pub index: usize,
    /// Correlation used for every path of the scenario.
    pub rho: f64,
}

/// Pooled Monte Carlo estimate over `m * p` paths.
///
/// Standard errors use the population standard deviation of the pooled
/// samples divided by `sqrt(sample_count)`.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::SimulationResult;
/// use std::time::Duration;
///
/// let result = SimulationResult {
///     expected_payoff: 0.14,
///     option_price: 0.1356,
///     standard_error: 0.002,
///     payoff_std_dev: 0.253,
///     payoff_mode: 0.01,
///     expected_terminal_price: 2.06,
///     terminal_std_dev: 0.19,
///     terminal_std_error: 0.0015,
///     price_mode: 1.99,
///     discount_factor: 0.9686,
///     sample_count: 16_000,
///     n_steps: 400,
///     elapsed: Duration::from_millis(250),
///     draws: Vec::new(),
///     payoffs: None,
///     terminal_prices: None,
/// };
///
/// assert!((result.confidence_95() - 0.00392).abs() < 1e-12);
/// assert_eq!(result.elapsed_seconds(), 0.25);
/// assert_eq!(result.total_steps(), 6_400_000);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationResult {
    /// Mean undiscounted payoff.
    pub expected_payoff: f64,
    /// Discounted price `exp(-rT) * expected_payoff`.
    pub option_price: f64,
    /// Standard error of `expected_payoff`.
    pub standard_error: f64,
    /// Population standard deviation of the payoffs.
    pub payoff_std_dev: f64,
    /// Centre of the fullest [`MODE_BIN_WIDTH`] bin of the payoff histogram.
    pub payoff_mode: f64,
    /// Mean terminal asset price.
    pub expected_terminal_price: f64,
    /// Population standard deviation of the terminal prices.
    pub terminal_std_dev: f64,
    /// Standard error of `expected_terminal_price`.
    pub terminal_std_error: f64,
    /// Centre of the fullest [`MODE_BIN_WIDTH`] bin of the terminal-price histogram.
    pub price_mode: f64,
    /// `exp(-rT)` applied to the payoff mean.
    pub discount_factor: f64,
    /// Pooled sample count `m * p`.
    pub sample_count: usize,
    /// Time steps per path.
    pub n_steps: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
    /// Per-scenario correlation draws, in scenario order.
    pub draws: Vec<ScenarioDraw>,
    /// Raw payoffs, scenario-major, when requested.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub payoffs: Option<Vec<f64>>,
    /// Raw terminal prices, scenario-major, when requested.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub terminal_prices: Option<Vec<f64>>,
}

impl SimulationResult {
    /// 95% confidence half-width of `expected_payoff`.
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.standard_error
    }

    /// Standard error of `option_price`.
    #[inline]
    pub fn price_standard_error(&self) -> f64 {
        self.discount_factor * self.standard_error
    }

    /// Euler steps taken across all paths, `sample_count * n_steps`.
    #[inline]
    pub fn total_steps(&self) -> usize {
        self.sample_count * self.n_steps
    }

    /// `elapsed` in seconds.
    #[inline]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Mean and population standard deviation, two-pass.
pub(crate) fn mean_and_std(samples: &[f64]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    (mean, variance.max(0.0).sqrt())
}

/// Mode estimate from a histogram of `bin_width` bins anchored at the sample
/// minimum. Returns the centre of the first fullest bin; the maximum falls in
/// the last bin.
pub(crate) fn histogram_mode(samples: &[f64], bin_width: f64) -> f64 {
    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    if !min.is_finite() || !max.is_finite() {
        return 0.0;
    }

    // Sparse: occupied bins never exceed the sample count.
    let last_bin = (((max - min) / bin_width).ceil() as u64).max(1) - 1;
    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
    for &x in samples {
        let bin = (((x - min) / bin_width).floor() as u64).min(last_bin);
        *counts.entry(bin).or_insert(0) += 1;
    }

    let mut fullest = (0, 0);
    for (&bin, &count) in &counts {
        if count > fullest.1 {
            fullest = (bin, count);
        }
    }
    min + (fullest.0 as f64 + 0.5) * bin_width
}
