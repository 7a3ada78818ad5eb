//! Pricing run configuration.
//!
//! Loaded from a TOML file, then overridden from `HESTON_*` environment
//! variables, then from command-line flags.
//!
//! ```toml
//! log_level = "info"
//!
//! [model]
//! spot = 2.0
//! strike = 2.0
//! n_steps = 400
//!
//! [simulation]
//! n_paths = 4000
//! n_scenarios = 4
//! variance_floor = "full_truncation"
//!
//! [correlation]
//! values = [-0.5, -0.7, -0.9]
//! probabilities = [0.25, 0.5, 0.25]
//! ```

use std::path::{Path, PathBuf};

use pricer_models::models::{CorrelationDistribution, HestonParams, ModelError, VarianceFloor};
use pricer_pricing::mc::{PayoffType, SimulationConfig, DEFAULT_PATHS, DEFAULT_SCENARIOS};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Configuration file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "heston.toml";

/// Heston model section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelSection {
    /// Initial asset price
    pub spot: f64,
    /// Initial variance
    pub v0: f64,
    /// Risk-free rate
    pub rate: f64,
    /// Mean-reversion speed
    pub kappa: f64,
    /// Long-run variance
    pub theta: f64,
    /// Volatility of variance
    pub sigma: f64,
    /// Maturity in years
    pub maturity: f64,
    /// Strike
    pub strike: f64,
    /// Time steps
    pub n_steps: usize,
}

impl Default for ModelSection {
    fn default() -> Self {
        let params = HestonParams::default();
        Self {
            spot: params.spot(),
            v0: params.v0(),
            rate: params.rate(),
            kappa: params.kappa(),
            theta: params.theta(),
            sigma: params.sigma(),
            maturity: params.maturity(),
            strike: params.strike(),
            n_steps: params.n_steps(),
        }
    }
}

/// Simulation section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationSection {
    /// Paths per scenario
    pub n_paths: usize,
    /// Number of scenarios
    pub n_scenarios: usize,
    /// Master seed
    pub seed: u64,
    /// Use the rayon pool
    pub parallel: bool,
    /// Keep raw samples in the output
    pub keep_samples: bool,
    /// Variance floor policy
    pub variance_floor: VarianceFloor,
    /// Payoff type
    pub payoff: PayoffType,
}

impl Default for SimulationSection {
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

/// Correlation distribution section.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorrelationSection {
    /// Correlation support points
    pub values: Vec<f64>,
    /// Probabilities, one per value
    pub probabilities: Vec<f64>,
}

impl Default for CorrelationSection {
    fn default() -> Self {
        Self {
            values: vec![-0.5, -0.7, -0.9],
            probabilities: vec![0.25, 0.5, 0.25],
        }
    }
}

/// Full pricing configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PricingConfig {
    /// Log level used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Model parameters
    #[serde(default)]
    pub model: ModelSection,

    /// Run sizes and options
    #[serde(default)]
    pub simulation: SimulationSection,

    /// Correlation distribution
    #[serde(default)]
    pub correlation: CorrelationSection,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            model: ModelSection::default(),
            simulation: SimulationSection::default(),
            correlation: CorrelationSection::default(),
        }
    }
}

impl PricingConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load `path` if given; otherwise [`DEFAULT_CONFIG_PATH`] when it exists,
    /// or the built-in reference configuration
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Log level after the `HESTON_LOG_LEVEL` override, readable before the
    /// subscriber exists
    pub fn effective_log_level(&self) -> String {
        std::env::var("HESTON_LOG_LEVEL").unwrap_or_else(|_| self.log_level.clone())
    }

    /// Apply environment variable overrides.
    ///
    /// Unparsable numeric values are ignored with a warning.
    pub fn with_env_override(mut self) -> Self {
        if let Some(seed) = env_parse("HESTON_SEED") {
            self.simulation.seed = seed;
        }

        if let Some(n_paths) = env_parse("HESTON_PATHS") {
            self.simulation.n_paths = n_paths;
        }

        if let Some(n_scenarios) = env_parse("HESTON_SCENARIOS") {
            self.simulation.n_scenarios = n_scenarios;
        }

        if let Some(n_steps) = env_parse("HESTON_STEPS") {
            self.model.n_steps = n_steps;
        }

        if let Ok(log_level) = std::env::var("HESTON_LOG_LEVEL") {
            self.log_level = log_level;
        }

        self
    }

    /// Validate configuration, collecting every problem
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!(
                "Invalid log_level '{}'. Valid values: {:?}",
                self.log_level, valid_log_levels
            ));
        }

        if let Err(e) = self.heston_params() {
            errors.push(e.to_string());
        }
        if let Err(e) = self.correlation_distribution() {
            errors.push(e.to_string());
        }
        if let Err(e) = self.simulation_config() {
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Build the model parameters
    pub fn heston_params(&self) -> Result<HestonParams, ModelError> {
        let m = &self.model;
        HestonParams::builder()
            .spot(m.spot)
            .v0(m.v0)
            .rate(m.rate)
            .kappa(m.kappa)
            .theta(m.theta)
            .sigma(m.sigma)
            .maturity(m.maturity)
            .strike(m.strike)
            .n_steps(m.n_steps)
            .build()
    }

    /// Build the correlation distribution
    pub fn correlation_distribution(&self) -> Result<CorrelationDistribution, ModelError> {
        CorrelationDistribution::new(
            self.correlation.values.clone(),
            self.correlation.probabilities.clone(),
        )
    }

    /// Build the engine configuration
    pub fn simulation_config(&self) -> Result<SimulationConfig, ModelError> {
        let s = &self.simulation;
        SimulationConfig::builder()
            .n_paths(s.n_paths)
            .n_scenarios(s.n_scenarios)
            .seed(s.seed)
            .parallel(s.parallel)
            .keep_samples(s.keep_samples)
            .variance_floor(s.variance_floor)
            .payoff(s.payoff)
            .build()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    parse_override(key, &raw)
}

/// Parses an override value, warning when it is rejected.
fn parse_override<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = raw, "Ignoring unparsable environment override");
            None
        }
    }
}

/// Configuration error
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("Cannot read {}: {message}", .path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// Parse error in config file
    #[error("Parse error: {0}")]
    Parse(String),

    /// Validation error
    #[error("Validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
