//! Assignment strategy configuration

use serde::Deserialize;
use std::sync::Arc;

use super::error::ValidationError;
use crate::domain::assignment::{
    AssignmentStrategy, BoundedRetryAssigner, MatchingAssigner, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_POOL_REDRAW_INTERVAL,
};

/// Which assigner runs the constrained draw
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Randomized augmenting-path matching; finds a bijection whenever one exists
    #[default]
    Exact,
    /// Randomized greedy retries over a sampled role pool
    BoundedRetry,
}

/// Assignment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentConfig {
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Retry budget for `bounded_retry`
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Re-sample the role pool every this many failed attempts
    #[serde(default = "default_pool_redraw_interval")]
    pub pool_redraw_interval: u32,
}

impl AssignmentConfig {
    pub fn build_strategy(&self) -> Arc<dyn AssignmentStrategy> {
        match self.strategy {
            StrategyKind::Exact => Arc::new(MatchingAssigner::new()),
            StrategyKind::BoundedRetry => Arc::new(BoundedRetryAssigner::new(
                self.max_attempts,
                self.pool_redraw_interval,
            )),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::MustBePositive("max_attempts"));
        }
        if self.pool_redraw_interval == 0 {
            return Err(ValidationError::MustBePositive("pool_redraw_interval"));
        }
        if self.pool_redraw_interval > self.max_attempts {
            return Err(ValidationError::RedrawIntervalTooLarge {
                interval: self.pool_redraw_interval,
                max_attempts: self.max_attempts,
            });
        }
        Ok(())
    }
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            max_attempts: default_max_attempts(),
            pool_redraw_interval: default_pool_redraw_interval(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_pool_redraw_interval() -> u32 {
    DEFAULT_POOL_REDRAW_INTERVAL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matching_is_the_default() {
        let config = AssignmentConfig::default();
        assert_eq!(config.strategy, StrategyKind::Exact);
        assert_eq!(config.build_strategy().name(), "exact");
        assert_eq!(config.max_attempts, 100);
        assert_eq!(config.pool_redraw_interval, 10);
    }

    #[test]
    fn bounded_retry_can_be_selected() {
        let config = AssignmentConfig {
            strategy: StrategyKind::BoundedRetry,
            ..Default::default()
        };
        assert_eq!(config.build_strategy().name(), "bounded_retry");
    }

    #[test]
    fn redraw_interval_must_fit_the_budget() {
        let config = AssignmentConfig {
            max_attempts: 5,
            pool_redraw_interval: 10,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::RedrawIntervalTooLarge { .. })
        ));
    }
}
