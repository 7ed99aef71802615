//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ROLE_LOTTERY` prefix and nested values use double underscores as separators.
//! Every value has a default, so an empty environment is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use role_lottery::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Sessions close after {:?}", config.lottery.input_timeout());
//! ```

mod assignment;
mod error;
mod logging;
mod lottery;

pub use assignment::{AssignmentConfig, StrategyKind};
pub use error::{ConfigError, ValidationError};
pub use logging::{Environment, LoggingConfig};
pub use lottery::LotteryConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Session timing and sizing
    #[serde(default)]
    pub lottery: LotteryConfig,

    /// Constrained draw strategy
    #[serde(default)]
    pub assignment: AssignmentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ROLE_LOTTERY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ROLE_LOTTERY__LOTTERY__INPUT_TIMEOUT_SECS=120` -> `lottery.input_timeout_secs = 120`
    /// - `ROLE_LOTTERY__ASSIGNMENT__STRATEGY=bounded_retry` -> `assignment.strategy = bounded_retry`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ROLE_LOTTERY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.lottery.validate()?;
        self.assignment.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.logging.is_production()
    }
}
