//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and event infrastructure
//! that form the vocabulary of the role lottery domain.

mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{ChannelId, MessageId, ParticipantId, RoleId, SessionId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
