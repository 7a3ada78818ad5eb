//! Black-Scholes prices for European options.
//!
//! **Call**: C = S·N(d₁) - K·e^(-rT)·N(d₂)
//! **Put**: P = K·e^(-rT)·N(-d₂) - S·N(-d₁)
//!
//! with d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T) and d₂ = d₁ - σ√T.

use num_traits::Float;

use super::distributions::norm_cdf;
use super::error::AnalyticalError;
use crate::models::HestonParams;

/// Black-Scholes model under lognormal dynamics.
///
/// # Examples
/// ```
/// use pricer_models::analytical::BlackScholes;
///
/// let bs = BlackScholes::new(100.0_f64, 0.05, 0.2).unwrap();
/// let call = bs.price_call(100.0, 1.0);
/// let put = bs.price_put(100.0, 1.0);
///
/// // Put-call parity: C - P = S - K*exp(-rT)
/// let parity = call - put - (100.0 - 100.0 * (-0.05_f64).exp());
/// assert!(parity.abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct BlackScholes<T: Float> {
    spot: T,
    rate: T,
    volatility: T,
}

impl<T: Float> BlackScholes<T> {
    /// Creates a new Black-Scholes model.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidSpot` if `spot <= 0`
    /// - `AnalyticalError::InvalidVolatility` if `volatility <= 0`
    pub fn new(spot: T, rate: T, volatility: T) -> Result<Self, AnalyticalError> {
        if !(spot > T::zero()) {
            return Err(AnalyticalError::InvalidSpot {
                spot: spot.to_f64().unwrap_or(f64::NAN),
            });
        }
        if !(volatility > T::zero()) {
            return Err(AnalyticalError::InvalidVolatility {
                volatility: volatility.to_f64().unwrap_or(f64::NAN),
            });
        }

        Ok(Self {
            spot,
            rate,
            volatility,
        })
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> T {
        self.spot
    }

    /// Returns the risk-free rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.rate
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> T {
        self.volatility
    }

    /// d₁ term. Requires `expiry > 0`.
    #[inline]
    pub fn d1(&self, strike: T, expiry: T) -> T {
        let half = T::one() / (T::one() + T::one());
        let drift = (self.rate + half * self.volatility * self.volatility) * expiry;
        ((self.spot / strike).ln() + drift) / (self.volatility * expiry.sqrt())
    }

    /// d₂ = d₁ - σ√T.
    #[inline]
    pub fn d2(&self, strike: T, expiry: T) -> T {
        self.d1(strike, expiry) - self.volatility * expiry.sqrt()
    }

    /// European call price; intrinsic value when `expiry <= 0`.
    pub fn price_call(&self, strike: T, expiry: T) -> T {
        if expiry <= T::zero() {
            return (self.spot - strike).max(T::zero());
        }
        let discount = (-self.rate * expiry).exp();
        self.spot * norm_cdf(self.d1(strike, expiry))
            - strike * discount * norm_cdf(self.d2(strike, expiry))
    }

    /// European put price; intrinsic value when `expiry <= 0`.
    pub fn price_put(&self, strike: T, expiry: T) -> T {
        if expiry <= T::zero() {
            return (strike - self.spot).max(T::zero());
        }
        let discount = (-self.rate * expiry).exp();
        strike * discount * norm_cdf(-self.d2(strike, expiry))
            - self.spot * norm_cdf(-self.d1(strike, expiry))
    }
}

impl BlackScholes<f64> {
    /// Black-Scholes equivalent of a constant-variance Heston model.
    ///
    /// With `sigma == 0` and `V0 == theta` the variance never moves, so the
    /// asset follows GBM with volatility `sqrt(V0)`.
    ///
    /// # Errors
    /// - `AnalyticalError::NotDegenerate` unless `sigma == 0` and `|V0 - theta| <= 1e-12`
    /// - `AnalyticalError::InvalidVolatility` if `V0 == 0`
    ///
    /// # Examples
    /// ```
    /// use pricer_models::analytical::BlackScholes;
    /// use pricer_models::models::HestonParams;
    ///
    /// let params = HestonParams::builder()
    ///     .sigma(0.0)
    ///     .v0(0.04)
    ///     .theta(0.04)
    ///     .build()
    ///     .unwrap();
    /// let bs = BlackScholes::from_degenerate_heston(&params).unwrap();
    /// assert!((bs.volatility() - 0.2).abs() < 1e-12);
    /// ```
    pub fn from_degenerate_heston(params: &HestonParams) -> Result<Self, AnalyticalError> {
        if params.sigma() != 0.0 {
            return Err(AnalyticalError::NotDegenerate {
                reason: format!("sigma = {}", params.sigma()),
            });
        }
        if (params.v0() - params.theta()).abs() > 1e-12 {
            return Err(AnalyticalError::NotDegenerate {
                reason: format!("v0 = {} differs from theta = {}", params.v0(), params.theta()),
            });
        }
        Self::new(params.spot(), params.rate(), params.v0().sqrt())
    }
}
