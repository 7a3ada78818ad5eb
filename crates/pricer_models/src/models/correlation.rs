//! Discrete distribution over the price/variance correlation.
//!
//! Each scenario of a pricing run draws one `rho` from a
//! [`CorrelationDistribution`] by inverse-CDF lookup on a uniform variate.

use super::error::ModelError;

/// Tolerance on `|sum(probabilities) - 1|`.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Finite categorical law over correlation values in `[-1, 1]`.
///
/// # Examples
///
/// ```
/// use pricer_models::models::CorrelationDistribution;
///
/// let dist = CorrelationDistribution::new(
///     vec![-0.5, -0.7, -0.9],
///     vec![0.25, 0.5, 0.25],
/// ).unwrap();
///
/// assert_eq!(dist.len(), 3);
/// assert!((dist.mean() + 0.7).abs() < 1e-12);
/// assert_eq!(dist.sample(0.1), -0.5);
/// assert_eq!(dist.sample(0.6), -0.7);
/// assert_eq!(dist.sample(0.9), -0.9);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CorrelationDistribution {
    values: Vec<f64>,
    probabilities: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(skip))]
    cumulative: Vec<f64>,
}

impl CorrelationDistribution {
    /// Creates a validated distribution.
    ///
    /// # Errors
    ///
    /// - `InvalidDistribution` when the inputs are empty, differ in length,
    ///   carry a negative or non-finite probability, or do not sum to one
    ///   within [`PROBABILITY_TOLERANCE`]
    /// - `InvalidParameter { name: "rho" }` when a value is outside `[-1, 1]`
    pub fn new(values: Vec<f64>, probabilities: Vec<f64>) -> Result<Self, ModelError> {
        if values.is_empty() {
            return Err(ModelError::invalid_distribution(
                "at least one correlation value is required",
            ));
        }
        if values.len() != probabilities.len() {
            return Err(ModelError::invalid_distribution(format!(
                "{} values but {} probabilities",
                values.len(),
                probabilities.len()
            )));
        }

        for &rho in &values {
            if !rho.is_finite() || !(-1.0..=1.0).contains(&rho) {
                return Err(ModelError::invalid_parameter(
                    "rho",
                    format!("must lie in [-1, 1], got {}", rho),
                ));
            }
        }

        for &p in &probabilities {
            if !p.is_finite() || p < 0.0 {
                return Err(ModelError::invalid_distribution(format!(
                    "probabilities must be finite and non-negative, got {}",
                    p
                )));
            }
        }

        let total: f64 = probabilities.iter().sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(ModelError::invalid_distribution(format!(
                "probabilities sum to {}, expected 1",
                total
            )));
        }

        let cumulative = cumulative_weights(&probabilities);

        Ok(Self {
            values,
            probabilities,
            cumulative,
        })
    }

    /// Point mass at a single correlation.
    pub fn constant(rho: f64) -> Result<Self, ModelError> {
        Self::new(vec![rho], vec![1.0])
    }

    /// Number of support points.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false` for a validated distribution.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Support points in input order.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Probabilities in input order.
    #[inline]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Correlation at support index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn value(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Probability-weighted mean correlation.
    pub fn mean(&self) -> f64 {
        self.iter().map(|(rho, p)| rho * p).sum()
    }

    /// Iterates over `(rho, probability)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values
            .iter()
            .copied()
            .zip(self.probabilities.iter().copied())
    }

    /// Support index selected by the uniform variate `u` in `[0, 1)`.
    #[inline]
    pub fn sample_index(&self, u: f64) -> usize {
        sample_index(&self.cumulative, u)
    }

    /// Correlation selected by the uniform variate `u` in `[0, 1)`.
    #[inline]
    pub fn sample(&self, u: f64) -> f64 {
        self.values[self.sample_index(u)]
    }
}

impl TryFrom<(Vec<f64>, Vec<f64>)> for CorrelationDistribution {
    type Error = ModelError;

    fn try_from((values, probabilities): (Vec<f64>, Vec<f64>)) -> Result<Self, Self::Error> {
        Self::new(values, probabilities)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CorrelationDistribution {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            values: Vec<f64>,
            probabilities: Vec<f64>,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.values, raw.probabilities).map_err(serde::de::Error::custom)
    }
}

/// Normalised running sums of `weights`.
///
/// Entries from the last positive weight onwards are pinned to exactly `1.0`,
/// so trailing zero weights share the top of the range with the last live
/// entry and are never the first to exceed `u`.
fn cumulative_weights(weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    let mut acc = 0.0;
    let mut cumulative: Vec<f64> = weights
        .iter()
        .map(|w| {
            acc += w;
            acc / total
        })
        .collect();
    if let Some(last_live) = weights.iter().rposition(|&w| w > 0.0) {
        for c in &mut cumulative[last_live..] {
            *c = 1.0;
        }
    }
    cumulative
}

/// Inverse-CDF lookup: the first index whose cumulative weight exceeds `u`.
///
/// Zero-weight entries are never selected. `u` at or beyond the final
/// cumulative weight maps to the first index reaching it, which is the last
/// entry with positive weight.
pub fn sample_index(cumulative: &[f64], u: f64) -> usize {
    let idx = cumulative.partition_point(|&c| c <= u);
    match cumulative.last() {
        Some(&top) if idx >= cumulative.len() => cumulative.partition_point(|&c| c < top),
        _ => idx,
    }
}
