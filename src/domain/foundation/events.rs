//! Event infrastructure for domain event publishing and handling.
//!
//! - `EventId` - Unique identifier for events (deduplication)
//! - `EventMetadata` - Correlation context
//! - `EventEnvelope` - Transport wrapper for domain events
//! - `DomainEvent` - Trait that all domain events implement
//! - `domain_event!` - Macro to simplify DomainEvent implementations

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::Timestamp;

// ============================================
// DomainEvent Trait
// ============================================

/// Trait that all domain events must implement.
///
/// Provides the contract for event identification, routing, and versioning.
/// Use the `domain_event!` macro to implement it.
pub trait DomainEvent: Send + Sync {
    /// Returns the event type string (e.g., "lottery.session_opened.v1").
    fn event_type(&self) -> &'static str;

    /// Returns the ID of the aggregate that emitted this event.
    fn aggregate_id(&self) -> String;

    /// Returns the type of aggregate (e.g., "LotterySession").
    fn aggregate_type(&self) -> &'static str;

    /// Returns when the event occurred.
    fn occurred_at(&self) -> Timestamp;

    /// Returns the unique ID for this event instance.
    fn event_id(&self) -> EventId;
}

/// Extension trait that provides `to_envelope()` for serializable domain events.
///
/// Automatically implemented for any `DomainEvent + Serialize`.
pub trait SerializableDomainEvent: DomainEvent + Serialize {
    /// Converts this domain event into an `EventEnvelope` for transport.
    fn to_envelope(&self) -> Result<EventEnvelope, serde_json::Error> {
        EventEnvelope::from_event(self)
    }
}

impl<T: DomainEvent + Serialize> SerializableDomainEvent for T {}

/// Macro to implement DomainEvent with minimal boilerplate.
///
/// ```ignore
/// domain_event!(
///     SessionOpened,
///     event_type = "lottery.session_opened.v1",
///     aggregate_id = session_id,
///     aggregate_type = "LotterySession",
///     occurred_at = opened_at,
///     event_id = event_id
/// );
/// ```
#[macro_export]
macro_rules! domain_event {
    (
        $event_name:ident,
        event_type = $event_type:expr,
        aggregate_id = $agg_id_field:ident,
        aggregate_type = $agg_type:expr,
        occurred_at = $occurred_field:ident,
        event_id = $event_id_field:ident
    ) => {
        impl $crate::domain::foundation::DomainEvent for $event_name {
            fn event_type(&self) -> &'static str {
                $event_type
            }

            fn aggregate_id(&self) -> String {
                self.$agg_id_field.to_string()
            }

            fn aggregate_type(&self) -> &'static str {
                $agg_type
            }

            fn occurred_at(&self) -> $crate::domain::foundation::Timestamp {
                self.$occurred_field
            }

            fn event_id(&self) -> $crate::domain::foundation::EventId {
                self.$event_id_field.clone()
            }
        }
    };
}

pub use domain_event;

/// Unique identifier for events (used for deduplication).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random EventId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates an EventId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation context carried alongside an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// ID linking related events of one session run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Participant whose action led to this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Transport envelope for domain events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique ID for this event instance.
    pub event_id: EventId,

    /// Event type for routing (e.g., "lottery.roles_assigned.v1").
    pub event_type: String,

    /// Schema version number (extracted from event_type).
    pub schema_version: u32,

    /// ID of the aggregate that emitted this event.
    pub aggregate_id: String,

    /// Type of aggregate.
    pub aggregate_type: String,

    /// When the event occurred.
    pub occurred_at: Timestamp,

    /// Event-specific payload as JSON.
    pub payload: JsonValue,

    /// Correlation metadata.
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    /// Creates a new EventEnvelope with required fields.
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        payload: JsonValue,
    ) -> Self {
        let event_type = event_type.into();
        let schema_version = Self::extract_version(&event_type);

        Self {
            event_id: EventId::new(),
            event_type,
            schema_version,
            aggregate_id: aggregate_id.into(),
            aggregate_type: aggregate_type.into(),
            occurred_at: Timestamp::now(),
            payload,
            metadata: EventMetadata::default(),
        }
    }

    /// Creates an envelope from a domain event, serializing it as the payload.
    pub fn from_event<T>(event: &T) -> Result<Self, serde_json::Error>
    where
        T: DomainEvent + Serialize + ?Sized,
    {
        let event_type = event.event_type().to_string();
        let schema_version = Self::extract_version(&event_type);

        Ok(Self {
            event_id: event.event_id(),
            event_type,
            schema_version,
            aggregate_id: event.aggregate_id(),
            aggregate_type: event.aggregate_type().to_string(),
            occurred_at: event.occurred_at(),
            payload: serde_json::to_value(event)?,
            metadata: EventMetadata::default(),
        })
    }

    /// Extracts version number from the event_type suffix; defaults to 1.
    pub(crate) fn extract_version(event_type: &str) -> u32 {
        event_type
            .rsplit_once(".v")
            .and_then(|(_, version_str)| version_str.parse::<u32>().ok())
            .unwrap_or(1)
    }

    /// Add correlation ID.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(id.into());
        self
    }

    /// Add the acting participant.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.metadata.actor = Some(actor.into());
        self
    }

    /// Deserialize payload to a specific event type.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[cfg(test)]
impl EventEnvelope {
    /// Creates a test fixture EventEnvelope for use in tests.
    pub fn test_fixture(event_type: &str, aggregate_id: &str) -> Self {
        Self::new(
            event_type,
            aggregate_id,
            "TestAggregate",
            serde_json::json!({"test": "data"}),
        )
    }
}
