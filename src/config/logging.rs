//! Logging configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Environment name
    #[serde(default)]
    pub environment: Environment,

    /// `tracing` filter directive, overridden by `RUST_LOG` when set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl LoggingConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// JSON output is forced in production.
    pub fn use_json(&self) -> bool {
        self.json || self.is_production()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.log_level.trim().is_empty() {
            return Err(ValidationError::EmptyLogFilter);
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info,role_lottery=debug".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_human_readable() {
        let config = LoggingConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.log_level, "info,role_lottery=debug");
        assert!(!config.use_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_forces_json() {
        let config = LoggingConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        assert!(config.use_json());
    }

    #[test]
    fn blank_filter_is_rejected() {
        let config = LoggingConfig {
            log_level: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::EmptyLogFilter));
    }
}
