//! Heston stochastic volatility model parameters.
//!
//! The Heston model is described by the SDEs:
//! ```text
//! dS = r * S * dt + sqrt(V) * S * dW_S
//! dV = kappa * (theta - V) * dt + sigma * sqrt(V) * dW_V
//! E[dW_S * dW_V] = rho * dt
//! ```
//! where:
//! - S = asset price
//! - V = instantaneous variance
//! - r = risk-free rate
//! - kappa = mean-reversion speed of the variance
//! - theta = long-run variance
//! - sigma = volatility of variance (vol-of-vol)
//! - rho = correlation between price and variance shocks
//!
//! The correlation is deliberately *not* part of [`HestonParams`]: it is drawn
//! per scenario from a [`CorrelationDistribution`](super::CorrelationDistribution).
//!
//! ## Feller condition
//!
//! ```text
//! 2 * kappa * theta > sigma^2
//! ```
//! When it holds the continuous variance process stays strictly positive.
//! The Euler discretisation can still go negative, which is handled by the
//! [`VarianceFloor`](super::VarianceFloor) policy rather than rejected here.
//!
//! ## Example
//!
//! ```
//! use pricer_models::models::HestonParams;
//!
//! let params = HestonParams::builder()
//!     .spot(100.0)
//!     .v0(0.04)
//!     .rate(0.05)
//!     .kappa(1.5)
//!     .theta(0.04)
//!     .sigma(0.3)
//!     .maturity(1.0)
//!     .strike(100.0)
//!     .n_steps(252)
//!     .build()
//!     .unwrap();
//!
//! assert!(params.satisfies_feller());
//! assert!((params.dt() - 1.0 / 252.0).abs() < 1e-15);
//! ```

use super::error::ModelError;

/// Heston model and contract parameters (the simulation's `ModelParameters`).
///
/// Immutable once built. `dt = maturity / n_steps` is derived and recomputed by
/// [`with_maturity`](Self::with_maturity) and [`with_n_steps`](Self::with_n_steps).
///
/// # Invariants
///
/// - `spot > 0`, `v0 >= 0`, `maturity > 0`, `n_steps >= 1`
/// - `kappa`, `theta`, `sigma`, `strike` are non-negative
/// - every value is finite
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HestonParams {
    spot: f64,
    v0: f64,
    rate: f64,
    kappa: f64,
    theta: f64,
    sigma: f64,
    maturity: f64,
    strike: f64,
    n_steps: usize,
    dt: f64,
}

impl HestonParams {
    /// Creates a new parameter builder seeded with the [`Default`] values.
    #[inline]
    pub fn builder() -> HestonParamsBuilder {
        HestonParamsBuilder::default()
    }

    /// Initial asset price `S0`.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Initial variance `V0`.
    #[inline]
    pub fn v0(&self) -> f64 {
        self.v0
    }

    /// Risk-free rate `r` (continuously compounded).
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Mean-reversion speed `kappa`.
    #[inline]
    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    /// Long-run variance `theta`.
    #[inline]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Volatility of variance `sigma`.
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Time to maturity `T` in years.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    /// Strike price `K`.
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Number of time steps `n`.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Time step `dt = T / n`.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Present-value factor `exp(-r * T)`.
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.maturity).exp()
    }

    /// Returns a copy with a new maturity, recomputing `dt`.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidParameter` if `maturity` is not positive and finite.
    pub fn with_maturity(self, maturity: f64) -> Result<Self, ModelError> {
        Self::from_parts(
            self.spot,
            self.v0,
            self.rate,
            self.kappa,
            self.theta,
            self.sigma,
            maturity,
            self.strike,
            self.n_steps,
        )
    }

    /// Returns a copy with a new step count, recomputing `dt`.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidParameter` if `n_steps` is zero.
    pub fn with_n_steps(self, n_steps: usize) -> Result<Self, ModelError> {
        Self::from_parts(
            self.spot,
            self.v0,
            self.rate,
            self.kappa,
            self.theta,
            self.sigma,
            self.maturity,
            self.strike,
            n_steps,
        )
    }

    /// Returns a copy with a new strike.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidParameter` if `strike` is negative or not finite.
    pub fn with_strike(self, strike: f64) -> Result<Self, ModelError> {
        Self::from_parts(
            self.spot,
            self.v0,
            self.rate,
            self.kappa,
            self.theta,
            self.sigma,
            self.maturity,
            strike,
            self.n_steps,
        )
    }

    /// Checks every invariant.
    ///
    /// Every constructor already runs this; the engine calls it again on
    /// entry.
    pub fn validate(&self) -> Result<(), ModelError> {
        finite("spot", self.spot)?;
        finite("v0", self.v0)?;
        finite("rate", self.rate)?;
        finite("kappa", self.kappa)?;
        finite("theta", self.theta)?;
        finite("sigma", self.sigma)?;
        finite("maturity", self.maturity)?;
        finite("strike", self.strike)?;

        if self.spot <= 0.0 {
            return Err(ModelError::invalid_parameter(
                "spot",
                format!("must be positive, got {}", self.spot),
            ));
        }
        if self.v0 < 0.0 {
            return Err(ModelError::invalid_parameter(
                "v0",
                format!("must be non-negative, got {}", self.v0),
            ));
        }
        if self.maturity <= 0.0 {
            return Err(ModelError::invalid_parameter(
                "maturity",
                format!("must be positive, got {}", self.maturity),
            ));
        }
        if self.n_steps < 1 {
            return Err(ModelError::invalid_parameter(
                "n_steps",
                format!("must be at least 1, got {}", self.n_steps),
            ));
        }
        non_negative("kappa", self.kappa)?;
        non_negative("theta", self.theta)?;
        non_negative("sigma", self.sigma)?;
        non_negative("strike", self.strike)?;

        Ok(())
    }

    /// Checks the Feller condition `2 * kappa * theta > sigma^2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricer_models::models::HestonParams;
    ///
    /// // 2 * 6.21 * 0.019 = 0.236 < 0.61^2 = 0.372
    /// let params = HestonParams::default();
    /// assert!(!params.satisfies_feller());
    /// ```
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.kappa * self.theta > self.sigma * self.sigma
    }

    /// Feller ratio `2 * kappa * theta / sigma^2`; infinite when `sigma == 0`.
    pub fn feller_ratio(&self) -> f64 {
        let denominator = self.sigma * self.sigma;
        if denominator > 0.0 {
            2.0 * self.kappa * self.theta / denominator
        } else {
            f64::INFINITY
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn from_parts(
        spot: f64,
        v0: f64,
        rate: f64,
        kappa: f64,
        theta: f64,
        sigma: f64,
        maturity: f64,
        strike: f64,
        n_steps: usize,
    ) -> Result<Self, ModelError> {
        let dt = if n_steps > 0 {
            maturity / n_steps as f64
        } else {
            f64::NAN
        };
        let params = Self {
            spot,
            v0,
            rate,
            kappa,
            theta,
            sigma,
            maturity,
            strike,
            n_steps,
            dt,
        };
        params.validate()?;
        Ok(params)
    }
}

impl Default for HestonParams {
    /// Parameters of the reference study (a one-year at-the-money call):
    /// - spot = strike = 2.0
    /// - v0 = 0.010201 (10.1% vol)
    /// - rate = 0.0319
    /// - kappa = 6.21, theta = 0.019, sigma = 0.61
    /// - maturity = 1.0, n_steps = 400
    fn default() -> Self {
        Self {
            spot: 2.0,
            v0: 0.010201,
            rate: 0.0319,
            kappa: 6.21,
            theta: 0.019,
            sigma: 0.61,
            maturity: 1.0,
            strike: 2.0,
            n_steps: 400,
            dt: 1.0 / 400.0,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for HestonParams {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            spot: f64,
            v0: f64,
            rate: f64,
            kappa: f64,
            theta: f64,
            sigma: f64,
            maturity: f64,
            strike: f64,
            n_steps: usize,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::from_parts(
            raw.spot,
            raw.v0,
            raw.rate,
            raw.kappa,
            raw.theta,
            raw.sigma,
            raw.maturity,
            raw.strike,
            raw.n_steps,
        )
        .map_err(serde::de::Error::custom)
    }
}

fn finite(name: &str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::invalid_parameter(
            name,
            format!("must be finite, got {}", value),
        ))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ModelError> {
    if value < 0.0 {
        Err(ModelError::invalid_parameter(
            name,
            format!("must be non-negative, got {}", value),
        ))
    } else {
        Ok(())
    }
}

/// Builder for [`HestonParams`].
///
/// Unset fields keep the [`HestonParams::default`] values. All invariants are
/// checked in [`build`](Self::build).
///
/// # Examples
///
/// ```
/// use pricer_models::models::{HestonParams, ModelError};
///
/// let err = HestonParams::builder().n_steps(0).build().unwrap_err();
/// assert_eq!(err.parameter_name(), Some("n_steps"));
/// ```
#[derive(Clone, Debug)]
pub struct HestonParamsBuilder {
    spot: f64,
    v0: f64,
    rate: f64,
    kappa: f64,
    theta: f64,
    sigma: f64,
    maturity: f64,
    strike: f64,
    n_steps: usize,
}

impl Default for HestonParamsBuilder {
    fn default() -> Self {
        let d = HestonParams::default();
        Self {
            spot: d.spot,
            v0: d.v0,
            rate: d.rate,
            kappa: d.kappa,
            theta: d.theta,
            sigma: d.sigma,
            maturity: d.maturity,
            strike: d.strike,
            n_steps: d.n_steps,
        }
    }
}

impl HestonParamsBuilder {
    /// Sets the initial asset price `S0`.
    #[inline]
    pub fn spot(mut self, spot: f64) -> Self {
        self.spot = spot;
        self
    }

    /// Sets the initial variance `V0`.
    #[inline]
    pub fn v0(mut self, v0: f64) -> Self {
        self.v0 = v0;
        self
    }

    /// Sets the risk-free rate `r`.
    #[inline]
    pub fn rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Sets the mean-reversion speed `kappa`.
    #[inline]
    pub fn kappa(mut self, kappa: f64) -> Self {
        self.kappa = kappa;
        self
    }

    /// Sets the long-run variance `theta`.
    #[inline]
    pub fn theta(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    /// Sets the volatility of variance `sigma`.
    #[inline]
    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Sets the maturity `T` in years.
    #[inline]
    pub fn maturity(mut self, maturity: f64) -> Self {
        self.maturity = maturity;
        self
    }

    /// Sets the strike `K`.
    #[inline]
    pub fn strike(mut self, strike: f64) -> Self {
        self.strike = strike;
        self
    }

    /// Sets the number of time steps `n`.
    #[inline]
    pub fn n_steps(mut self, n_steps: usize) -> Self {
        self.n_steps = n_steps;
        self
    }

    /// Builds and validates the parameters.
    ///
    /// # Errors
    ///
    /// `ModelError::InvalidParameter` naming the first violated invariant.
    pub fn build(self) -> Result<HestonParams, ModelError> {
        HestonParams::from_parts(
            self.spot,
            self.v0,
            self.rate,
            self.kappa,
            self.theta,
            self.sigma,
            self.maturity,
            self.strike,
            self.n_steps,
        )
    }
}
