//! EventSubscriber port - Interface for subscribing to lottery events.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// Handlers run after the session task has moved on; they observe the
/// lottery and never influence it.
///
/// ```ignore
/// #[async_trait]
/// impl EventHandler for ResultArchive {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let assigned: RolesAssigned = event.payload_as()?;
///         self.store(assigned).await
///     }
///
///     fn name(&self) -> &'static str {
///         "ResultArchive"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name used in log fields.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events by type.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe the same handler to several event types.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        for event_type in event_types {
            self.subscribe(event_type, Arc::clone(&handler));
        }
    }
}

/// Combined trait for event bus implementations.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}
