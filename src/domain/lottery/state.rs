//! SessionState - lifecycle of a selection session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle state of a selection session.
///
/// ```text
/// Collecting ─► Locking ─► Assigning ─► Complete
///     │                        └──────► Infeasible
///     ├──► TimedOut
///     └──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    #[default]
    Collecting,
    Locking,
    Assigning,
    Complete,
    Infeasible,
    TimedOut,
    Cancelled,
}

impl SessionState {
    /// Whether participant input is still accepted.
    pub fn is_collecting(&self) -> bool {
        matches!(self, SessionState::Collecting)
    }
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionState::*;
        match self {
            Collecting => vec![Locking, TimedOut, Cancelled],
            Locking => vec![Assigning],
            Assigning => vec![Complete, Infeasible],
            Complete | Infeasible | TimedOut | Cancelled => vec![],
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Collecting => "COLLECTING",
            SessionState::Locking => "LOCKING",
            SessionState::Assigning => "ASSIGNING",
            SessionState::Complete => "COMPLETE",
            SessionState::Infeasible => "INFEASIBLE",
            SessionState::TimedOut => "TIMED_OUT",
            SessionState::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}
