//! Simulation run configuration.
//!
//! Sizes, seeding and execution options for a [`ScenarioPricer`](super::ScenarioPricer)
//! run. Model inputs live in [`HestonParams`](pricer_models::models::HestonParams).

use pricer_models::models::{ModelError, VarianceFloor};

use super::payoff::PayoffType;

/// Maximum number of paths per scenario.
pub const MAX_PATHS: usize = 10_000_000;

/// Maximum number of scenarios per run.
pub const MAX_SCENARIOS: usize = 100_000;

/// Maximum pooled sample count (`n_paths * n_scenarios`).
pub const MAX_TOTAL_SAMPLES: usize = 100_000_000;

/// Default paths per scenario (`m`).
pub const DEFAULT_PATHS: usize = 4_000;

/// Default number of scenarios (`p`).
pub const DEFAULT_SCENARIOS: usize = 4;

/// Monte Carlo run configuration.
///
/// Immutable; use [`SimulationConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::SimulationConfig;
///
/// let config = SimulationConfig::builder()
///     .n_paths(1_000)
///     .n_scenarios(3)
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.total_samples(), 3_000);
/// assert!(config.parallel());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// Paths per scenario (`m`).
    n_paths: usize,
    /// Number of scenarios (`p`).
    n_scenarios: usize,
    /// Master seed.
    seed: u64,
    /// Fan path chunks out over the rayon pool.
    parallel: bool,
    /// Keep raw payoffs and terminal prices in the result.
    keep_samples: bool,
    /// Treatment of negative discretised variance.
    variance_floor: VarianceFloor,
    /// Payoff evaluated on terminal prices.
    payoff: PayoffType,
}

impl SimulationConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Returns the number of paths per scenario.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Returns the number of scenarios.
    #[inline]
    pub fn n_scenarios(&self) -> usize {
        self.n_scenarios
    }

    /// Returns the pooled sample count `n_paths * n_scenarios`.
    #[inline]
    pub fn total_samples(&self) -> usize {
        self.n_paths * self.n_scenarios
    }

    /// Returns the master seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns whether path chunks run on the rayon pool.
    #[inline]
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Returns whether raw samples are kept in the result.
    #[inline]
    pub fn keep_samples(&self) -> bool {
        self.keep_samples
    }

    /// Returns the variance floor policy.
    #[inline]
    pub fn variance_floor(&self) -> VarianceFloor {
        self.variance_floor
    }

    /// Returns the payoff type.
    #[inline]
    pub fn payoff(&self) -> PayoffType {
        self.payoff
    }

    /// Validates the run sizes.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidParameter` if:
    /// - `n_paths` is 0 or greater than [`MAX_PATHS`]
    /// - `n_scenarios` is 0 or greater than [`MAX_SCENARIOS`]
    /// - the pooled sample count exceeds [`MAX_TOTAL_SAMPLES`]
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_run_size(self.n_paths, self.n_scenarios).map(|_| ())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_paths: DEFAULT_PATHS,
            n_scenarios: DEFAULT_SCENARIOS,
            seed: 0,
            parallel: true,
            keep_samples: false,
            variance_floor: VarianceFloor::default(),
            payoff: PayoffType::default(),
        }
    }
}

/// Checks `m` and `p` and returns the pooled sample count.
pub(crate) fn validate_run_size(n_paths: usize, n_scenarios: usize) -> Result<usize, ModelError> {
    if n_paths == 0 || n_paths > MAX_PATHS {
        return Err(ModelError::invalid_parameter(
            "n_paths",
            format!("must be in [1, {}], got {}", MAX_PATHS, n_paths),
        ));
    }
    if n_scenarios == 0 || n_scenarios > MAX_SCENARIOS {
        return Err(ModelError::invalid_parameter(
            "n_scenarios",
            format!("must be in [1, {}], got {}", MAX_SCENARIOS, n_scenarios),
        ));
    }
    match n_paths.checked_mul(n_scenarios) {
        Some(total) if total <= MAX_TOTAL_SAMPLES => Ok(total),
        _ => Err(ModelError::invalid_parameter(
            "n_scenarios",
            format!(
                "{} scenarios of {} paths exceed {} pooled samples",
                n_scenarios, n_paths, MAX_TOTAL_SAMPLES
            ),
        )),
    }
}

/// Builder for [`SimulationConfig`].
///
/// Unset fields keep the [`SimulationConfig::default`] values.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::VarianceFloor;
/// use pricer_pricing::mc::{PayoffType, SimulationConfig};
///
/// let config = SimulationConfig::builder()
///     .n_paths(50_000)
///     .n_scenarios(8)
///     .variance_floor(VarianceFloor::Reflection)
///     .payoff(PayoffType::Put)
///     .parallel(false)
///     .build()
///     .expect("valid config");
///
/// assert_eq!(config.variance_floor(), VarianceFloor::Reflection);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl SimulationConfigBuilder {
    /// Sets the number of paths per scenario, in `[1, MAX_PATHS]`.
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.config.n_paths = n_paths;
        self
    }

    /// Sets the number of scenarios, in `[1, MAX_SCENARIOS]`.
    #[inline]
    pub fn n_scenarios(mut self, n_scenarios: usize) -> Self {
        self.config.n_scenarios = n_scenarios;
        self
    }

    /// Sets the master seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Enables or disables the rayon fan-out.
    #[inline]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Keeps raw payoffs and terminal prices in the result.
    #[inline]
    pub fn keep_samples(mut self, keep_samples: bool) -> Self {
        self.config.keep_samples = keep_samples;
        self
    }

    /// Sets the variance floor policy.
    #[inline]
    pub fn variance_floor(mut self, variance_floor: VarianceFloor) -> Self {
        self.config.variance_floor = variance_floor;
        self
    }

    /// Sets the payoff type.
    #[inline]
    pub fn payoff(mut self, payoff: PayoffType) -> Self {
        self.config.payoff = payoff;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidParameter` naming the offending field.
    pub fn build(self) -> Result<SimulationConfig, ModelError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
