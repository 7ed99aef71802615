//! Terminal outcome of a session.

use std::sync::Arc;

use super::SessionState;
use crate::domain::assignment::{Assignment, Infeasible};

/// How a session ended. Set once, then shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalOutcome {
    Complete(Arc<Assignment>),
    Infeasible(Infeasible),
    TimedOut,
    Cancelled,
}

impl TerminalOutcome {
    /// The terminal state this outcome corresponds to.
    pub fn state(&self) -> SessionState {
        match self {
            TerminalOutcome::Complete(_) => SessionState::Complete,
            TerminalOutcome::Infeasible(_) => SessionState::Infeasible,
            TerminalOutcome::TimedOut => SessionState::TimedOut,
            TerminalOutcome::Cancelled => SessionState::Cancelled,
        }
    }

    pub fn assignment(&self) -> Option<&Arc<Assignment>> {
        match self {
            TerminalOutcome::Complete(assignment) => Some(assignment),
            _ => None,
        }
    }
}
