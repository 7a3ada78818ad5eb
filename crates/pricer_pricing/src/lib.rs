//! # Pricer Pricing
//!
//! Monte Carlo pricing of European options under the Heston model with a
//! scenario-drawn price/variance correlation.
//!
//! - [`rng`]: seeded random sources and independent per-task streams
//! - [`mc`]: path evolver, scenario aggregator and run configuration
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_models::models::{CorrelationDistribution, HestonParams};
//! use pricer_pricing::mc::{ScenarioPricer, SimulationConfig};
//!
//! let params = HestonParams::builder()
//!     .spot(2.0)
//!     .strike(2.0)
//!     .n_steps(100)
//!     .build()
//!     .unwrap();
//! let dist = CorrelationDistribution::new(vec![-0.5, -0.7, -0.9], vec![0.25, 0.5, 0.25]).unwrap();
//!
//! let config = SimulationConfig::builder().n_paths(1_000).n_scenarios(4).seed(1).build().unwrap();
//! let result = ScenarioPricer::new(config).price(&params, &dist).unwrap();
//!
//! assert_eq!(result.sample_count, 4_000);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for configuration and results

#![warn(missing_docs)]

pub mod mc;
pub mod rng;
