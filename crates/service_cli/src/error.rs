//! Error types for the `heston-mc` binary.

use pricer_models::models::ModelError;
use pricer_pricing::mc::SimulationError;
use thiserror::Error;

use crate::config::ConfigError;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Model inputs rejected
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Pricing run failed
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    /// Output could not be serialised
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),

    /// Invalid command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CliError::InvalidArgument("unknown format 'xml'".to_string());
        assert_eq!(err.to_string(), "Invalid argument: unknown format 'xml'");
    }

    #[test]
    fn test_model_error_conversion() {
        let err: CliError = ModelError::invalid_parameter("n_steps", "must be at least 1, got 0").into();
        assert!(err.to_string().contains("n_steps"));
    }

    #[test]
    fn test_cancelled_conversion() {
        let err: CliError = SimulationError::Cancelled.into();
        assert_eq!(err.to_string(), "Simulation error: Simulation cancelled");
    }
}
