//! Lottery domain events.
//!
//! Events recorded by a selection session as it moves through its lifecycle:
//! - `SessionOpened` - session accepted input for the first time
//! - `PickRecorded` - a pick or claim was accepted
//! - `ExclusionsUpdated` - a participant's exclusion set changed
//! - `SessionLocked` - input closed, draw pending
//! - `RolesAssigned` / `AssignmentFailed` - the draw's result
//! - `SessionTimedOut` / `SessionCancelled` - ended without a draw

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{PickToken, SessionMode};
use crate::domain::assignment::{InfeasibilityReason, RoleGrant};
use crate::domain::foundation::{
    domain_event, EventEnvelope, EventId, ParticipantId, RoleId, SerializableDomainEvent,
    SessionId, Timestamp,
};

const AGGREGATE: &str = "LotterySession";

/// Every event type a session can publish, in lifecycle order.
pub const EVENT_TYPES: [&str; 8] = [
    "lottery.session_opened.v1",
    "lottery.pick_recorded.v1",
    "lottery.exclusions_updated.v1",
    "lottery.session_locked.v1",
    "lottery.roles_assigned.v1",
    "lottery.assignment_failed.v1",
    "lottery.session_timed_out.v1",
    "lottery.session_cancelled.v1",
];

/// Published when a session opens for input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOpened {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub mode: SessionMode,
    pub available_roles: Vec<RoleId>,
    /// Empty for open lotteries.
    pub roster: Vec<ParticipantId>,
    pub opened_at: Timestamp,
}

domain_event!(
    SessionOpened,
    event_type = "lottery.session_opened.v1",
    aggregate_id = session_id,
    aggregate_type = AGGREGATE,
    occurred_at = opened_at,
    event_id = event_id
);

/// Published when a pick (open lottery) or claim (instant pick) is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickRecorded {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub participant: ParticipantId,
    pub token: PickToken,
    /// Role revealed by the claim; `None` until the draw in open lotteries.
    pub role: Option<RoleId>,
    pub recorded_at: Timestamp,
}

domain_event!(
    PickRecorded,
    event_type = "lottery.pick_recorded.v1",
    aggregate_id = session_id,
    aggregate_type = AGGREGATE,
    occurred_at = recorded_at,
    event_id = event_id
);

/// Published when a participant's exclusion set changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionsUpdated {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub participant: ParticipantId,
    pub excluded: BTreeSet<RoleId>,
    pub updated_at: Timestamp,
}

domain_event!(
    ExclusionsUpdated,
    event_type = "lottery.exclusions_updated.v1",
    aggregate_id = session_id,
    aggregate_type = AGGREGATE,
    occurred_at = updated_at,
    event_id = event_id
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLocked {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub participants: usize,
    pub locked_at: Timestamp,
}

domain_event!(
    SessionLocked,
    event_type = "lottery.session_locked.v1",
    aggregate_id = session_id,
    aggregate_type = AGGREGATE,
    occurred_at = locked_at,
    event_id = event_id
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesAssigned {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub grants: Vec<RoleGrant>,
    pub attempts: u32,
    pub assigned_at: Timestamp,
}

domain_event!(
    RolesAssigned,
    event_type = "lottery.roles_assigned.v1",
    aggregate_id = session_id,
    aggregate_type = AGGREGATE,
    occurred_at = assigned_at,
    event_id = event_id
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentFailed {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub reason: InfeasibilityReason,
    pub attempts: u32,
    pub failed_at: Timestamp,
}

domain_event!(
    AssignmentFailed,
    event_type = "lottery.assignment_failed.v1",
    aggregate_id = session_id,
    aggregate_type = AGGREGATE,
    occurred_at = failed_at,
    event_id = event_id
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTimedOut {
    pub event_id: EventId,
    pub session_id: SessionId,
    pub timed_out_at: Timestamp,
}

domain_event!(
    SessionTimedOut,
    event_type = "lottery.session_timed_out.v1",
    aggregate_id = session_id,
    aggregate_type = AGGREGATE,
    occurred_at = timed_out_at,
    event_id = event_id
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCancelled {
    pub event_id: EventId,
    pub session_id: SessionId,
    /// `None` when the coordinator cancelled during shutdown.
    pub cancelled_by: Option<ParticipantId>,
    pub cancelled_at: Timestamp,
}

domain_event!(
    SessionCancelled,
    event_type = "lottery.session_cancelled.v1",
    aggregate_id = session_id,
    aggregate_type = AGGREGATE,
    occurred_at = cancelled_at,
    event_id = event_id
);

/// Any event a selection session records.
#[derive(Debug, Clone)]
pub enum LotteryEvent {
    Opened(SessionOpened),
    PickRecorded(PickRecorded),
    ExclusionsUpdated(ExclusionsUpdated),
    Locked(SessionLocked),
    RolesAssigned(RolesAssigned),
    AssignmentFailed(AssignmentFailed),
    TimedOut(SessionTimedOut),
    Cancelled(SessionCancelled),
}

impl LotteryEvent {
    /// Wraps the event for the publisher.
    pub fn to_envelope(&self) -> Result<EventEnvelope, serde_json::Error> {
        match self {
            LotteryEvent::Opened(e) => e.to_envelope(),
            LotteryEvent::PickRecorded(e) => e.to_envelope(),
            LotteryEvent::ExclusionsUpdated(e) => e.to_envelope(),
            LotteryEvent::Locked(e) => e.to_envelope(),
            LotteryEvent::RolesAssigned(e) => e.to_envelope(),
            LotteryEvent::AssignmentFailed(e) => e.to_envelope(),
            LotteryEvent::TimedOut(e) => e.to_envelope(),
            LotteryEvent::Cancelled(e) => e.to_envelope(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ChannelId, DomainEvent, MessageId};

    fn session_id() -> SessionId {
        SessionId::new(ChannelId::new(10), MessageId::new(20))
    }

    #[test]
    fn envelope_carries_type_and_aggregate() {
        let event = LotteryEvent::TimedOut(SessionTimedOut {
            event_id: EventId::new(),
            session_id: session_id(),
            timed_out_at: Timestamp::now(),
        });
        let envelope = event.to_envelope().unwrap();
        assert_eq!(envelope.event_type, "lottery.session_timed_out.v1");
        assert_eq!(envelope.aggregate_id, "10_20");
        assert_eq!(envelope.aggregate_type, "LotterySession");
    }

    #[test]
    fn exclusions_payload_round_trips() {
        let event = ExclusionsUpdated {
            event_id: EventId::new(),
            session_id: session_id(),
            participant: ParticipantId::new("alice").unwrap(),
            excluded: BTreeSet::from([RoleId::new("top").unwrap()]),
            updated_at: Timestamp::now(),
        };
        assert_eq!(event.event_type(), "lottery.exclusions_updated.v1");

        let envelope = event.to_envelope().unwrap();
        let decoded: ExclusionsUpdated = envelope.payload_as().unwrap();
        assert_eq!(decoded.excluded, event.excluded);
    }
}
