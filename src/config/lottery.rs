//! Lottery session timing and sizing

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::coordinator::CoordinatorSettings;

const MAX_INPUT_TIMEOUT_SECS: u64 = 3_600;
const MAX_GRACE_PERIOD_SECS: u64 = 600;
const MAX_DRAW_DELAY_MS: u64 = 30_000;

/// Lottery session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LotteryConfig {
    /// Seconds a session collects input before timing out
    #[serde(default = "default_input_timeout")]
    pub input_timeout_secs: u64,

    /// Seconds a finished session (and its workspace) is kept
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: u64,

    /// Suspense pause before the draw result, in milliseconds
    #[serde(default = "default_draw_delay")]
    pub draw_delay_ms: u64,

    /// Smallest voice roster an exclusion lottery accepts
    #[serde(default = "default_min_participants")]
    pub exclusion_min_participants: usize,

    /// Capacity of each per-session action channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Finished sessions remembered for "show my role"
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl LotteryConfig {
    pub fn input_timeout(&self) -> Duration {
        Duration::from_secs(self.input_timeout_secs)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    pub fn draw_delay(&self) -> Duration {
        Duration::from_millis(self.draw_delay_ms)
    }

    /// Coordinator settings built from this section.
    pub fn settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            input_timeout: self.input_timeout(),
            grace_period: self.grace_period(),
            draw_delay: self.draw_delay(),
            exclusion_min_participants: self.exclusion_min_participants,
            event_buffer: self.event_buffer,
            history_limit: self.history_limit,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.input_timeout_secs == 0 || self.input_timeout_secs > MAX_INPUT_TIMEOUT_SECS {
            return Err(ValidationError::InvalidInputTimeout {
                max: MAX_INPUT_TIMEOUT_SECS,
            });
        }
        if self.grace_period_secs > MAX_GRACE_PERIOD_SECS {
            return Err(ValidationError::InvalidGracePeriod {
                max: MAX_GRACE_PERIOD_SECS,
            });
        }
        if self.draw_delay_ms > MAX_DRAW_DELAY_MS {
            return Err(ValidationError::InvalidDrawDelay {
                max: MAX_DRAW_DELAY_MS,
            });
        }
        if self.exclusion_min_participants == 0 {
            return Err(ValidationError::InvalidMinParticipants);
        }
        if self.event_buffer == 0 {
            return Err(ValidationError::MustBePositive("event_buffer"));
        }
        if self.history_limit == 0 {
            return Err(ValidationError::MustBePositive("history_limit"));
        }
        Ok(())
    }
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            input_timeout_secs: default_input_timeout(),
            grace_period_secs: default_grace_period(),
            draw_delay_ms: default_draw_delay(),
            exclusion_min_participants: default_min_participants(),
            event_buffer: default_event_buffer(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_input_timeout() -> u64 {
    300
}

fn default_grace_period() -> u64 {
    30
}

fn default_draw_delay() -> u64 {
    2_000
}

fn default_min_participants() -> usize {
    2
}

fn default_event_buffer() -> usize {
    64
}

fn default_history_limit() -> usize {
    256
}
