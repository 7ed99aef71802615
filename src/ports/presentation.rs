//! PresentationAdapter port - the chat surface a session lives on.
//!
//! The core never renders anything. It posts an announcement, pushes
//! notices as the session progresses, and asks the surface for the
//! authoritative toggle state of a participant whenever a toggle event
//! arrives.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::domain::foundation::{ChannelId, DomainError, MessageId, ParticipantId, RoleId, SessionId};
use crate::domain::lottery::{
    LotteryError, PickToken, SessionMode, SessionProgress, TerminalOutcome,
};

/// What a new session's message must offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAnnouncement {
    pub mode: SessionMode,
    pub available_roles: Vec<RoleId>,
    /// Numbered tokens for pick modes; empty for exclusion sessions.
    pub tokens: Vec<PickToken>,
    /// Eligible participants; empty for open lotteries.
    pub roster: Vec<ParticipantId>,
    pub input_timeout: Duration,
}

/// Something the surface should show about a session.
#[derive(Debug, Clone)]
pub enum Notice {
    /// An open-lottery pick was accepted.
    Joined {
        participant: ParticipantId,
        token: PickToken,
        progress: SessionProgress,
    },
    /// An instant-pick claim revealed a role.
    RoleClaimed {
        participant: ParticipantId,
        token: PickToken,
        role: RoleId,
        progress: SessionProgress,
    },
    /// Shown only to `participant`; session state is unchanged.
    Rejected {
        participant: ParticipantId,
        reason: LotteryError,
    },
    /// Input closed; the draw result follows after the suspense delay.
    Drawing { participants: usize },
    /// The session reached a terminal state.
    Finished {
        outcome: TerminalOutcome,
        progress: SessionProgress,
    },
}

/// Port for the presentation layer.
#[async_trait]
pub trait PresentationAdapter: Send + Sync {
    /// Posts the session message in `channel` and returns its id.
    async fn post_session(
        &self,
        channel: ChannelId,
        announcement: &SessionAnnouncement,
    ) -> Result<MessageId, DomainError>;

    /// Shows a notice for a session.
    async fn notify(&self, session_id: SessionId, notice: Notice) -> Result<(), DomainError>;

    /// Re-reads the roles `participant` currently has toggled off.
    ///
    /// This is the authoritative state; toggle events only say "look again".
    async fn current_toggles(
        &self,
        session_id: SessionId,
        participant: &ParticipantId,
    ) -> Result<BTreeSet<RoleId>, DomainError>;
}
