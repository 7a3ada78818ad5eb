//! # Random Number Generation
//!
//! Seeded random sources for the Monte Carlo engine.
//!
//! - [`RandomSource`]: the draws the engine needs (uniform and standard normal)
//! - [`PricerRng`]: default implementation over `rand::StdRng`
//!
//! Parallel runs never share a generator. Each unit of work opens its own
//! stream with [`PricerRng::for_stream`], keyed by the run seed and a stream
//! identifier, so results do not depend on how work is scheduled.
//!
//! ```rust
//! use pricer_pricing::rng::{PricerRng, RandomSource};
//!
//! let mut rng = PricerRng::from_seed(12345);
//! let u = rng.uniform();
//! let z = rng.standard_normal();
//! assert!((0.0..1.0).contains(&u));
//! assert!(z.is_finite());
//! ```

mod prng;

pub use prng::{PricerRng, RandomSource};
