//! Infeasibility outcomes of an assignment attempt.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ParticipantId, RoleId};

/// Why no bijection could be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InfeasibilityReason {
    /// Nobody joined the session.
    NoParticipants,
    /// More participants than roles.
    TooManyParticipants { participants: usize, roles: usize },
    /// These participants refuse every role on offer.
    EmptyPermittedSet { participants: Vec<ParticipantId> },
    /// These participants together accept fewer roles than their headcount.
    OverConstrained {
        participants: Vec<ParticipantId>,
        roles: Vec<RoleId>,
    },
    /// The attempt budget ran out even though a valid assignment exists.
    AttemptsExhausted { attempts: u32 },
    /// Assignment failed unexpectedly; details are in the operator log.
    Internal,
}

impl fmt::Display for InfeasibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfeasibilityReason::NoParticipants => write!(f, "nobody joined"),
            InfeasibilityReason::TooManyParticipants {
                participants,
                roles,
            } => write!(f, "{} participants but only {} roles", participants, roles),
            InfeasibilityReason::EmptyPermittedSet { participants } => write!(
                f,
                "{} excluded every role",
                join(participants)
            ),
            InfeasibilityReason::OverConstrained {
                participants,
                roles,
            } => {
                if roles.is_empty() {
                    write!(f, "{} leave no role between them", join(participants))
                } else {
                    write!(
                        f,
                        "{} only accept {} between them",
                        join(participants),
                        join(roles)
                    )
                }
            }
            InfeasibilityReason::AttemptsExhausted { attempts } => {
                write!(f, "no assignment found after {} attempts", attempts)
            }
            InfeasibilityReason::Internal => write!(f, "could not assign"),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Terminal "could not assign" outcome with the attempts it consumed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("assignment infeasible: {reason}")]
pub struct Infeasible {
    pub reason: InfeasibilityReason,
    pub attempts: u32,
}

impl Infeasible {
    /// Infeasibility detected before any attempt was made.
    pub fn immediate(reason: InfeasibilityReason) -> Self {
        Self {
            reason,
            attempts: 0,
        }
    }

    pub fn after(reason: InfeasibilityReason, attempts: u32) -> Self {
        Self { reason, attempts }
    }

    pub fn code(&self) -> ErrorCode {
        match self.reason {
            InfeasibilityReason::Internal => ErrorCode::InternalError,
            _ => ErrorCode::AssignmentInfeasible,
        }
    }
}
