//! Lottery-specific error types.

use thiserror::Error;

use super::{PickToken, SessionMode, SessionState};
use crate::domain::foundation::{DomainError, ErrorCode, ParticipantId, SessionId, ValidationError};

/// Why a session operation or submitted event was rejected.
///
/// A rejection never changes session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotteryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    #[error("session {0} already exists")]
    DuplicateSession(SessionId),

    #[error("session is {0} and no longer accepts input")]
    SessionClosed(SessionState),

    #[error("{0} is not a participant of this session")]
    NotParticipant(ParticipantId),

    #[error("token {token} was already claimed by {claimed_by}")]
    AffordanceClaimed {
        token: PickToken,
        claimed_by: ParticipantId,
    },

    #[error("session is full ({capacity} participants)")]
    SessionFull { capacity: usize },

    #[error("{action} is not available in {mode} sessions")]
    UnsupportedAction {
        action: &'static str,
        mode: SessionMode,
    },

    #[error("invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("presentation unavailable: {0}")]
    PresentationUnavailable(String),

    #[error("coordinator is shutting down")]
    ShuttingDown,
}

impl LotteryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LotteryError::Validation(err) => err.code(),
            LotteryError::SessionNotFound(_) => ErrorCode::SessionNotFound,
            LotteryError::DuplicateSession(_) => ErrorCode::SessionExists,
            LotteryError::SessionClosed(_) => ErrorCode::SessionClosed,
            LotteryError::NotParticipant(_) => ErrorCode::NotParticipant,
            LotteryError::AffordanceClaimed { .. } => ErrorCode::AffordanceClaimed,
            LotteryError::SessionFull { .. } => ErrorCode::SessionFull,
            LotteryError::UnsupportedAction { .. } => ErrorCode::UnsupportedAction,
            LotteryError::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
            LotteryError::PresentationUnavailable(_) => ErrorCode::PresentationError,
            LotteryError::ShuttingDown => ErrorCode::InternalError,
        }
    }

    pub(crate) fn unsupported(action: &'static str, mode: SessionMode) -> Self {
        LotteryError::UnsupportedAction { action, mode }
    }
}

impl From<DomainError> for LotteryError {
    fn from(err: DomainError) -> Self {
        LotteryError::PresentationUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ChannelId, MessageId};

    #[test]
    fn validation_keeps_its_code() {
        let err: LotteryError = ValidationError::empty_field("roster").into();
        assert_eq!(err.code(), ErrorCode::EmptyField);
    }

    #[test]
    fn messages_name_the_problem() {
        let id = SessionId::new(ChannelId::new(1), MessageId::new(2));
        assert_eq!(
            LotteryError::SessionNotFound(id).to_string(),
            "session 1_2 not found"
        );
        assert_eq!(
            LotteryError::SessionClosed(SessionState::TimedOut).to_string(),
            "session is TIMED_OUT and no longer accepts input"
        );
        assert_eq!(
            LotteryError::unsupported("execute", SessionMode::InstantPick).to_string(),
            "execute is not available in instant_pick sessions"
        );
    }
}
