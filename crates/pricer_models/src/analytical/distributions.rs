//! Standard normal density and distribution functions.
//!
//! Generic over `T: Float` so the reference formulas can be evaluated in
//! `f32` or `f64`.

use num_traits::Float;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Abramowitz and Stegun 7.1.26 coefficients, constant term first.
const ERFC_COEFFS: [f64; 5] = [
    0.254829592,
    -0.284496736,
    1.421413741,
    -1.453152027,
    1.061405429,
];

const ERFC_P: f64 = 0.3275911;

/// Converts an `f64` literal into `T`, yielding NaN for unrepresentable input.
#[inline]
fn lit<T: Float>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::nan)
}

/// Complementary error function, absolute error below 1.5e-7.
#[inline]
fn erfc<T: Float>(x: T) -> T {
    let a = x.abs();
    let t = T::one() / (T::one() + lit::<T>(ERFC_P) * a);

    let poly = ERFC_COEFFS
        .iter()
        .rev()
        .fold(T::zero(), |acc, &c| lit::<T>(c) + t * acc);
    let tail = t * poly * (-a * a).exp();

    if x < T::zero() {
        lit::<T>(2.0) - tail
    } else {
        tail
    }
}

/// Standard normal CDF `Φ(x) = erfc(-x / sqrt(2)) / 2`.
///
/// # Examples
/// ```
/// use pricer_models::analytical::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
/// assert!(norm_cdf(-3.0_f64) < 0.01);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    lit::<T>(0.5) * erfc(-x / lit::<T>(std::f64::consts::SQRT_2))
}

/// Standard normal PDF `φ(x) = exp(-x² / 2) / sqrt(2π)`.
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    lit::<T>(FRAC_1_SQRT_2PI) * (-lit::<T>(0.5) * x * x).exp()
}
