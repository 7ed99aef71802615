//! ParticipantDirectory port - who is eligible right now.

use async_trait::async_trait;

use crate::domain::foundation::{ChannelId, DomainError, ParticipantId};

/// The voice scope an initiator is currently in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceScope {
    pub name: String,
    pub channel: ChannelId,
    /// Eligible members, bots already filtered out.
    pub members: Vec<ParticipantId>,
}

/// Port for enumerating eligible participants.
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// Returns the voice scope `initiator` is in, or `None` if they are in none.
    async fn voice_scope(&self, initiator: &ParticipantId) -> Result<Option<VoiceScope>, DomainError>;

    /// Whether `participant` is an automated account that may never take part.
    async fn is_bot(&self, participant: &ParticipantId) -> Result<bool, DomainError>;
}
