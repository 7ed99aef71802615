//! EventPublisher port - Interface for publishing lottery events.
//!
//! The coordinator publishes session lifecycle events without knowing
//! which transport carries them.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Publishing is fire-and-report: the coordinator logs a failure and moves
/// on, so implementations must not block on slow consumers.
///
/// # Example
///
/// ```ignore
/// for event in session.take_events() {
///     publisher.publish(event.to_envelope()?).await?;
/// }
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events in order.
    ///
    /// Stops at the first failure; events before it stay published.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
