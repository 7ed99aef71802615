//! In-memory event bus.
//!
//! Delivers lottery events in-process, in publish order, to handlers
//! subscribed by event type. Every published envelope is also kept so
//! tests and the console can inspect what a session emitted.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

/// In-process event bus.
///
/// Features:
/// - Synchronous delivery in publish order
/// - Event capture for assertions and inspection
/// - Handler registration per event type
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.subscribe_all(&EVENT_TYPES, Arc::new(AuditLog));
///
/// bus.publish(envelope).await?;
/// assert!(bus.has_event("lottery.roles_assigned.v1"));
/// ```
pub struct InMemoryEventBus {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
    published: RwLock<Vec<EventEnvelope>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: RwLock::new(Vec::new()),
        }
    }

    /// Every envelope published so far, oldest first.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Events of one session, keyed by its aggregate id (`channel_message`).
    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect()
    }

    pub fn clear(&self) {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.event_type == event_type)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());

        // Clone handlers so no lock is held across an await
        let type_handlers: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event.event_type)
            .cloned()
            .unwrap_or_default();

        let mut errors = Vec::new();
        for handler in type_handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                tracing::warn!(handler = handler.name(), event_type = %event.event_type, error = %e, "event handler failed");
                errors.push(format!("{}: {}", handler.name(), e));
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Handler errors: {}", errors.join(", ")),
            ));
        }

        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }
}
