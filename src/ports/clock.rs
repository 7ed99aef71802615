//! Clock port - monotonic time for deadlines.

use tokio::time::Instant;

/// Source of monotonic time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Reads tokio's clock, which tests can pause and advance.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn follows_paused_time() {
        let clock = TokioClock;
        let start = clock.now();
        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(clock.now() - start, Duration::from_secs(300));
    }
}
