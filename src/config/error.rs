//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Log filter must not be empty")]
    EmptyLogFilter,

    #[error("Input timeout must be between 1 and {max} seconds")]
    InvalidInputTimeout { max: u64 },

    #[error("Grace period must not exceed {max} seconds")]
    InvalidGracePeriod { max: u64 },

    #[error("Draw delay must not exceed {max} milliseconds")]
    InvalidDrawDelay { max: u64 },

    #[error("Exclusion sessions need at least 1 participant")]
    InvalidMinParticipants,

    #[error("{0} must be at least 1")]
    MustBePositive(&'static str),

    #[error("Pool redraw interval ({interval}) exceeds max attempts ({max_attempts})")]
    RedrawIntervalTooLarge { interval: u32, max_attempts: u32 },
}
