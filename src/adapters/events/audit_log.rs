//! AuditLog - writes every lottery event to the tracing output.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventHandler;

/// Event handler that records lifecycle events as structured log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuditLog;

#[async_trait]
impl EventHandler for AuditLog {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        tracing::info!(
            target: "role_lottery::audit",
            event_type = %event.event_type,
            session_id = %event.aggregate_id,
            actor = event.metadata.actor.as_deref().unwrap_or("-"),
            payload = %event.payload,
            "lottery event"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "AuditLog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn never_fails() {
        let envelope = EventEnvelope::test_fixture("lottery.session_opened.v1", "1_1").with_actor("alice");
        assert!(AuditLog.handle(envelope).await.is_ok());
    }
}
