//! Unconstrained draw used by the open lottery.

use rand::seq::SliceRandom;
use rand::RngCore;

use super::{Assignment, InfeasibilityReason, Infeasible, RoleGrant};
use crate::domain::foundation::{ParticipantId, RoleId};

/// Shuffles `participants` and hands out `roles` in order.
///
/// Grants come back in shuffled order, which is also the announcement order.
pub fn shuffle_draw(
    participants: &[ParticipantId],
    roles: &[RoleId],
    rng: &mut dyn RngCore,
) -> Result<Assignment, Infeasible> {
    if participants.is_empty() {
        return Err(Infeasible::immediate(InfeasibilityReason::NoParticipants));
    }
    if participants.len() > roles.len() {
        return Err(Infeasible::immediate(
            InfeasibilityReason::TooManyParticipants {
                participants: participants.len(),
                roles: roles.len(),
            },
        ));
    }

    let mut drawn = participants.to_vec();
    drawn.shuffle(rng);
    let grants = drawn
        .into_iter()
        .zip(roles.iter().cloned())
        .map(|(participant, role)| RoleGrant { participant, role })
        .collect();

    Assignment::from_grants(grants, 1).map_err(|err| {
        tracing::error!(error = %err, "open lottery draw produced duplicates");
        Infeasible::after(InfeasibilityReason::Internal, 1)
    })
}
