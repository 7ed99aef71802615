//! Participant actions and their acknowledgements.

use std::collections::BTreeSet;
use std::fmt;
use tokio::sync::oneshot;

use crate::domain::foundation::{ParticipantId, RoleId};
use crate::domain::lottery::{LotteryError, PickToken};

/// What a participant did on the presentation surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Picked or claimed a numbered token.
    Pick(PickToken),
    /// Toggled a role's exclusion affordance on.
    ToggleAdd(RoleId),
    /// Toggled a role's exclusion affordance off.
    ToggleRemove(RoleId),
    /// Asked for the draw to start.
    Execute,
    /// Abandoned the session.
    Cancel,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Pick(_) => "pick",
            ActionKind::ToggleAdd(_) => "toggle_add",
            ActionKind::ToggleRemove(_) => "toggle_remove",
            ActionKind::Execute => "execute",
            ActionKind::Cancel => "cancel",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Pick(token) => write!(f, "pick {}", token),
            ActionKind::ToggleAdd(role) => write!(f, "toggle_add {}", role),
            ActionKind::ToggleRemove(role) => write!(f, "toggle_remove {}", role),
            other => f.write_str(other.name()),
        }
    }
}

/// Accepted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Joined {
        token: PickToken,
        joined: usize,
        capacity: usize,
    },
    Claimed {
        token: PickToken,
        role: RoleId,
        claimed: usize,
        total: usize,
    },
    /// Duplicate pick; the first one stands.
    AlreadyPicked,
    /// Exclusion set after re-reading the participant's toggles.
    Exclusions {
        excluded: BTreeSet<RoleId>,
        changed: bool,
    },
    /// Input closed; the draw is under way.
    Locked,
    Cancelled,
}

pub(crate) type Reply = oneshot::Sender<Result<Ack, LotteryError>>;

/// An action queued for a session task, with the channel for its answer.
#[derive(Debug)]
pub(crate) struct ActionEvent<T> {
    pub actor: ParticipantId,
    pub payload: T,
    pub reply: Reply,
}

impl<T> ActionEvent<T> {
    pub fn new(actor: ParticipantId, payload: T) -> (Self, oneshot::Receiver<Result<Ack, LotteryError>>) {
        let (reply, rx) = oneshot::channel();
        (
            Self {
                actor,
                payload,
                reply,
            },
            rx,
        )
    }

    /// Sends the answer. A caller that stopped waiting is not an error.
    pub fn respond(self, result: Result<Ack, LotteryError>) {
        let _ = self.reply.send(result);
    }
}
