//! Error types for the Monte Carlo engine.

use pricer_models::models::ModelError;
use thiserror::Error;

/// Errors returned by a pricing run.
///
/// Validation failures from the model layer pass through unchanged, so
/// callers can match on [`ModelError`] variants directly.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::ModelError;
/// use pricer_pricing::mc::SimulationError;
///
/// let err: SimulationError = ModelError::invalid_parameter("n_paths", "must be at least 1, got 0").into();
/// assert_eq!(err.to_string(), "Invalid parameter 'n_paths': must be at least 1, got 0");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Invalid model parameters, distribution or run sizes.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The run was cancelled through its [`CancellationToken`](super::CancellationToken).
    #[error("Simulation cancelled")]
    Cancelled,
}

impl SimulationError {
    /// Returns the wrapped model error, if any.
    pub fn as_model_error(&self) -> Option<&ModelError> {
        match self {
            Self::Model(err) => Some(err),
            Self::Cancelled => None,
        }
    }
}
