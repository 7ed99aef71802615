//! Runtime knobs for the coordinator.

use std::time::Duration;

/// Timing and sizing used by every session the coordinator runs.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// How long a session collects input before timing out.
    pub input_timeout: Duration,
    /// How long a finished session stays addressable before eviction.
    pub grace_period: Duration,
    /// Suspense pause between locking and the draw result.
    pub draw_delay: Duration,
    /// Smallest roster an exclusion session accepts.
    pub exclusion_min_participants: usize,
    /// Capacity of each per-session action channel.
    pub event_buffer: usize,
    /// Finished sessions remembered for late queries and "show my role".
    pub history_limit: usize,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            input_timeout: Duration::from_secs(300),
            grace_period: Duration::from_secs(30),
            draw_delay: Duration::from_secs(2),
            exclusion_min_participants: 2,
            event_buffer: 64,
            history_limit: 256,
        }
    }
}

impl CoordinatorSettings {
    pub fn with_input_timeout(mut self, timeout: Duration) -> Self {
        self.input_timeout = timeout;
        self
    }

    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    pub fn with_draw_delay(mut self, delay: Duration) -> Self {
        self.draw_delay = delay;
        self
    }
}
