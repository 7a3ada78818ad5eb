//! Closed-form references for validating the Monte Carlo engine.
//!
//! When the vol-of-variance is zero and `V0 == theta`, the Heston variance
//! stays at `V0` and the model collapses to Black-Scholes with
//! `sigma_bs = sqrt(V0)`. The formulas here give the exact price for that
//! degenerate case.

pub mod black_scholes;
pub mod distributions;
pub mod error;

pub use black_scholes::BlackScholes;
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
