//! ShowMyRoleHandler - Query handler for a participant's latest role.

use thiserror::Error;

use crate::application::coordinator::SessionCoordinator;
use crate::domain::catalog::Role;
use crate::domain::foundation::{ErrorCode, ParticipantId, RoleId, SessionId, Timestamp};

#[derive(Debug, Clone)]
pub struct ShowMyRoleQuery {
    pub participant: ParticipantId,
}

/// The role with its flavor text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyRole {
    pub session_id: SessionId,
    pub role: Role,
    pub assigned_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShowMyRoleError {
    #[error("{0} has not been assigned a role yet")]
    NoRole(ParticipantId),

    #[error("role '{0}' is no longer in the catalog")]
    Retired(RoleId),
}

impl ShowMyRoleError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ShowMyRoleError::NoRole(_) => ErrorCode::NotParticipant,
            ShowMyRoleError::Retired(_) => ErrorCode::UnknownRole,
        }
    }
}

pub struct ShowMyRoleHandler {
    coordinator: SessionCoordinator,
}

impl ShowMyRoleHandler {
    pub fn new(coordinator: SessionCoordinator) -> Self {
        Self { coordinator }
    }

    /// Reads finished results only; live sessions are never touched.
    pub fn handle(&self, query: ShowMyRoleQuery) -> Result<MyRole, ShowMyRoleError> {
        let current = self
            .coordinator
            .current_role(&query.participant)
            .ok_or_else(|| ShowMyRoleError::NoRole(query.participant.clone()))?;
        let role = self
            .coordinator
            .catalog()
            .get(&current.role)
            .cloned()
            .ok_or(ShowMyRoleError::Retired(current.role))?;
        Ok(MyRole {
            session_id: current.session_id,
            role,
            assigned_at: current.assigned_at,
        })
    }
}
