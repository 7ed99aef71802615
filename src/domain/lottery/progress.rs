//! SessionProgress - read-only snapshot used for progress rendering.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use super::{Pick, PickToken, SessionMode, SessionState};
use crate::domain::foundation::{ParticipantId, RoleId, SessionId};

/// A revealed instant-pick claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claim {
    pub participant: ParticipantId,
    pub token: PickToken,
    pub role: RoleId,
}

/// Mode-specific input collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SlotProgress {
    OpenLottery {
        picks: Vec<Pick>,
        capacity: usize,
    },
    InstantPick {
        claims: Vec<Claim>,
        total: usize,
        remaining_tokens: Vec<PickToken>,
    },
    ExclusionThenLottery {
        roster: Vec<ParticipantId>,
        exclusions: BTreeMap<ParticipantId, BTreeSet<RoleId>>,
    },
}

/// Snapshot of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub session_id: SessionId,
    pub mode: SessionMode,
    pub state: SessionState,
    pub available_roles: Vec<RoleId>,
    pub slots: SlotProgress,
    /// Time left before the input deadline; `None` once input has closed.
    #[serde(skip)]
    pub remaining: Option<Duration>,
}

impl SessionProgress {
    pub fn with_remaining(mut self, remaining: Option<Duration>) -> Self {
        self.remaining = remaining;
        self
    }

    /// Participants who have joined so far.
    pub fn joined(&self) -> usize {
        match &self.slots {
            SlotProgress::OpenLottery { picks, .. } => picks.len(),
            SlotProgress::InstantPick { claims, .. } => claims.len(),
            SlotProgress::ExclusionThenLottery { roster, .. } => roster.len(),
        }
    }
}
