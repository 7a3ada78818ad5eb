//! Monte Carlo engine for the Heston model.
//!
//! # Architecture
//!
//! ```text
//! ScenarioPricer
//! ├── SimulationConfig   (m, p, seed, parallel, floor, payoff)
//! ├── PricerRng          (master stream: one uniform per scenario)
//! └── per scenario
//!     ├── CorrelationDistribution::sample_index  -> rho
//!     ├── EulerStepper                           (path evolver)
//!     └── PricerRng::for_stream per chunk        (rayon par_chunks_mut)
//! summarise()  -> SimulationResult
//! ```
//!
//! [`simulate_batch`] and [`price_with_source`] expose the two stages with
//! an injected [`RandomSource`](crate::rng::RandomSource).
//!
//! ```rust
//! use pricer_models::models::{CorrelationDistribution, HestonParams};
//! use pricer_pricing::mc::{ScenarioPricer, SimulationConfig};
//!
//! let params = HestonParams::default();
//! let dist = CorrelationDistribution::new(vec![-0.5, -0.7, -0.9], vec![0.25, 0.5, 0.25]).unwrap();
//! let config = SimulationConfig::builder().n_paths(2_000).n_scenarios(2).seed(7).build().unwrap();
//!
//! let result = ScenarioPricer::new(config).price(&params, &dist).unwrap();
//! println!("{:.4} +/- {:.4}", result.option_price, result.price_standard_error());
//! ```

mod aggregator;
mod cancel;
mod config;
mod error;
mod evolver;
mod payoff;
mod result;

pub use aggregator::{price_with_source, ScenarioPricer};
pub use cancel::CancellationToken;
pub use config::{
    SimulationConfig, SimulationConfigBuilder, DEFAULT_PATHS, DEFAULT_SCENARIOS, MAX_PATHS,
    MAX_SCENARIOS, MAX_TOTAL_SAMPLES,
};
pub use error::SimulationError;
pub use evolver::{simulate_batch, simulate_batch_parallel, EulerStepper, PricePath, PATHS_PER_TASK};
pub use payoff::PayoffType;
pub use result::{ScenarioDraw, SimulationResult, MODE_BIN_WIDTH};
