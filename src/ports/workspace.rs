//! WorkspaceProvisioner port - scoped private channels.

use async_trait::async_trait;

use crate::domain::foundation::{ChannelId, DomainError, ParticipantId};

/// A private channel visible only to `members`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRequest {
    pub name: String,
    pub topic: String,
    pub members: Vec<ParticipantId>,
}

/// Port for creating and tearing down private workspaces.
///
/// A workspace outlives its session by the grace period so participants
/// can read the result.
#[async_trait]
pub trait WorkspaceProvisioner: Send + Sync {
    async fn create(&self, request: WorkspaceRequest) -> Result<ChannelId, DomainError>;

    /// Deletes the workspace. Releasing an unknown channel is not an error.
    async fn release(&self, channel: ChannelId) -> Result<(), DomainError>;
}
