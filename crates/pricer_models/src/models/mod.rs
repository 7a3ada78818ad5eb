//! Heston model inputs.
//!
//! - [`HestonParams`]: validated model and contract parameters
//! - [`CorrelationDistribution`]: discrete law the per-scenario `rho` is drawn from
//! - [`VarianceFloor`]: treatment of negative discretised variance
//! - [`ModelError`]: validation failures

pub mod correlation;
pub mod error;
pub mod heston;
pub mod variance;

pub use correlation::{sample_index, CorrelationDistribution, PROBABILITY_TOLERANCE};
pub use error::ModelError;
pub use heston::{HestonParams, HestonParamsBuilder};
pub use variance::VarianceFloor;
