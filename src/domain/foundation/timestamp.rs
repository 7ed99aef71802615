//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Immutable wall-clock point in time, always UTC.
///
/// Used for event metadata only; deadlines run on the monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn earlier_is_before_later() {
        let early = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let late = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).unwrap());
        assert!(early.is_before(&late));
        assert_eq!(late.duration_since(&early), Duration::minutes(5));
    }

    #[test]
    fn serializes_transparently() {
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-03-01T12:00:00Z\"");
    }
}
