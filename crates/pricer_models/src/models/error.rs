//! Error types for model parameter and scenario validation.
//!
//! This module provides:
//! - `ModelError`: Invalid Heston parameters or correlation distributions

use thiserror::Error;

/// Validation errors raised before any simulation work begins.
///
/// Every variant names the offending input so that a failed run can be
/// traced back to a single configuration entry.
///
/// # Variants
/// - `InvalidParameter`: A model or simulation parameter is out of range
/// - `InvalidDistribution`: The correlation distribution is malformed
///
/// # Examples
/// ```
/// use pricer_models::models::ModelError;
///
/// let err = ModelError::invalid_parameter("n_steps", "must be at least 1, got 0");
/// assert_eq!(
///     format!("{}", err),
///     "Invalid parameter 'n_steps': must be at least 1, got 0"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModelError {
    /// A parameter violates its domain (e.g. `n < 1`, `T <= 0`, `|rho| > 1`).
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The correlation distribution is not a valid probability law.
    #[error("Invalid correlation distribution: {reason}")]
    InvalidDistribution {
        /// Why the distribution was rejected.
        reason: String,
    },
}

impl ModelError {
    /// Creates an `InvalidParameter` error.
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidDistribution` error.
    pub fn invalid_distribution(reason: impl Into<String>) -> Self {
        Self::InvalidDistribution {
            reason: reason.into(),
        }
    }

    /// Returns the parameter name for `InvalidParameter`, `None` otherwise.
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            Self::InvalidParameter { name, .. } => Some(name),
            Self::InvalidDistribution { .. } => None,
        }
    }
}
