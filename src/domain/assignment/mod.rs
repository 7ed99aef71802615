//! Assignment module - turns permitted sets into a participant → role bijection.
//!
//! Two strategies implement [`AssignmentStrategy`]:
//!
//! - [`BoundedRetryAssigner`] - randomized walk over a sampled role pool,
//!   giving up after a fixed attempt budget.
//! - [`MatchingAssigner`] - exact augmenting-path matching; succeeds whenever
//!   a bijection exists.
//!
//! Both screen the input the same way, so the cheap infeasibility reasons
//! (`NoParticipants`, `TooManyParticipants`, `EmptyPermittedSet`) never
//! consume an attempt.

#[allow(clippy::module_inception)]
mod assignment;
mod bounded_retry;
mod draw;
mod infeasible;
mod matching;

pub use assignment::{Assignment, Candidate, RoleGrant};
pub use bounded_retry::{BoundedRetryAssigner, DEFAULT_MAX_ATTEMPTS, DEFAULT_POOL_REDRAW_INTERVAL};
pub use draw::shuffle_draw;
pub use infeasible::{InfeasibilityReason, Infeasible};
pub use matching::MatchingAssigner;

use rand::RngCore;
use std::collections::HashSet;

use crate::domain::foundation::RoleId;

/// Produces a bijection honoring every candidate's permitted set.
pub trait AssignmentStrategy: Send + Sync {
    /// Assigns each candidate one role from `catalog`.
    ///
    /// Grants come back in the candidates' input order.
    fn assign(
        &self,
        candidates: &[Candidate],
        catalog: &[RoleId],
        rng: &mut dyn RngCore,
    ) -> Result<Assignment, Infeasible>;

    /// Short name used in logs and configuration.
    fn name(&self) -> &'static str;
}

/// Rejects inputs that no strategy could satisfy, without any attempt.
pub(crate) fn screen(candidates: &[Candidate], catalog: &[RoleId]) -> Result<(), Infeasible> {
    if candidates.is_empty() {
        return Err(Infeasible::immediate(InfeasibilityReason::NoParticipants));
    }

    let roles: HashSet<&RoleId> = catalog.iter().collect();
    if candidates.len() > roles.len() {
        return Err(Infeasible::immediate(
            InfeasibilityReason::TooManyParticipants {
                participants: candidates.len(),
                roles: roles.len(),
            },
        ));
    }

    let stranded: Vec<_> = candidates
        .iter()
        .filter(|c| !c.permitted().iter().any(|role| roles.contains(role)))
        .map(|c| c.participant().clone())
        .collect();
    if !stranded.is_empty() {
        return Err(Infeasible::immediate(
            InfeasibilityReason::EmptyPermittedSet {
                participants: stranded,
            },
        ));
    }
    Ok(())
}

/// Zips candidates with their chosen roles into a validated assignment.
fn build_assignment(
    candidates: &[Candidate],
    chosen: &[&RoleId],
    attempts: u32,
) -> Result<Assignment, Infeasible> {
    let grants = candidates
        .iter()
        .zip(chosen)
        .map(|(candidate, role)| RoleGrant {
            participant: candidate.participant().clone(),
            role: (*role).clone(),
        })
        .collect();
    Assignment::from_grants(grants, attempts).map_err(|err| {
        tracing::error!(error = %err, "strategy produced an invalid assignment");
        Infeasible::after(InfeasibilityReason::Internal, attempts)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ParticipantId;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn catalog(size: usize) -> Vec<RoleId> {
        (0..size)
            .map(|i| RoleId::new(&format!("r{}", i)).unwrap())
            .collect()
    }

    fn candidates_from(masks: &[u8], roles: &[RoleId]) -> Vec<Candidate> {
        masks
            .iter()
            .enumerate()
            .map(|(i, mask)| {
                let permitted: BTreeSet<RoleId> = roles
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| mask & (1 << bit) != 0)
                    .map(|(_, role)| role.clone())
                    .collect();
                Candidate::new(ParticipantId::new(format!("p{}", i)).unwrap(), permitted)
            })
            .collect()
    }

    fn strategies() -> Vec<Box<dyn AssignmentStrategy>> {
        vec![
            Box::new(BoundedRetryAssigner::default()),
            Box::new(MatchingAssigner::new()),
        ]
    }

    #[test]
    fn screen_rejects_empty_input() {
        let err = screen(&[], &catalog(3)).unwrap_err();
        assert_eq!(err.reason, InfeasibilityReason::NoParticipants);
        assert_eq!(err.attempts, 0);
    }

    #[test]
    fn screen_counts_distinct_catalog_roles() {
        let roles = catalog(1);
        let doubled = vec![roles[0].clone(), roles[0].clone()];
        let candidates = candidates_from(&[0b1, 0b1], &roles);
        let err = screen(&candidates, &doubled).unwrap_err();
        assert_eq!(
            err.reason,
            InfeasibilityReason::TooManyParticipants {
                participants: 2,
                roles: 1
            }
        );
    }

    #[test]
    fn example_one_pins_the_constrained_participant() {
        let roles: Vec<RoleId> = ["a", "b", "c"]
            .iter()
            .map(|k| RoleId::new(k).unwrap())
            .collect();
        let candidates = vec![
            Candidate::from_exclusions(
                ParticipantId::new("p1").unwrap(),
                &BTreeSet::from([roles[1].clone(), roles[2].clone()]),
                &roles,
            ),
            Candidate::from_exclusions(ParticipantId::new("p2").unwrap(), &BTreeSet::new(), &roles),
            Candidate::from_exclusions(ParticipantId::new("p3").unwrap(), &BTreeSet::new(), &roles),
        ];

        for strategy in strategies() {
            for seed in 0..20 {
                let mut rng = StdRng::seed_from_u64(seed);
                let assignment = strategy.assign(&candidates, &roles, &mut rng).unwrap();
                assert_eq!(assignment.role_of(candidates[0].participant()), Some(&roles[0]));
                let rest: BTreeSet<_> = [
                    assignment.role_of(candidates[1].participant()).cloned(),
                    assignment.role_of(candidates[2].participant()).cloned(),
                ]
                .into_iter()
                .flatten()
                .collect();
                assert_eq!(rest, BTreeSet::from([roles[1].clone(), roles[2].clone()]));
            }
        }
    }

    #[test]
    fn example_two_fails_without_attempts() {
        let roles = catalog(3);
        let candidates = vec![Candidate::from_exclusions(
            ParticipantId::new("p1").unwrap(),
            &roles.iter().cloned().collect(),
            &roles,
        )];

        for strategy in strategies() {
            let mut rng = StdRng::seed_from_u64(0);
            let err = strategy.assign(&candidates, &roles, &mut rng).unwrap_err();
            assert_eq!(err.attempts, 0);
            assert!(matches!(
                err.reason,
                InfeasibilityReason::EmptyPermittedSet { .. }
            ));
        }
    }

    #[test]
    fn grants_follow_input_order() {
        let roles = catalog(5);
        let candidates = candidates_from(&[0b11111; 4], &roles);
        for strategy in strategies() {
            let mut rng = StdRng::seed_from_u64(11);
            let assignment = strategy.assign(&candidates, &roles, &mut rng).unwrap();
            let order: Vec<_> = assignment.grants().iter().map(|g| &g.participant).collect();
            let expected: Vec<_> = candidates.iter().map(|c| c.participant()).collect();
            assert_eq!(order, expected);
        }
    }

    proptest! {
        #[test]
        fn too_many_participants_never_attempts(extra in 1usize..4, roles in 1usize..6, seed in any::<u64>()) {
            let roles = catalog(roles);
            let candidates = candidates_from(&vec![0xff; roles.len() + extra], &roles);
            for strategy in strategies() {
                let mut rng = StdRng::seed_from_u64(seed);
                let err = strategy.assign(&candidates, &roles, &mut rng).unwrap_err();
                prop_assert_eq!(err.attempts, 0);
                let is_pigeonhole = matches!(err.reason, InfeasibilityReason::TooManyParticipants { .. });
                prop_assert!(is_pigeonhole);
            }
        }

        #[test]
        fn any_success_is_a_bijection_honoring_permits(
            masks in prop::collection::vec(0u8..32, 1..=5),
            seed in any::<u64>(),
        ) {
            let roles = catalog(5);
            let candidates = candidates_from(&masks, &roles);
            for strategy in strategies() {
                let mut rng = StdRng::seed_from_u64(seed);
                if let Ok(assignment) = strategy.assign(&candidates, &roles, &mut rng) {
                    prop_assert!(assignment.honors(&candidates));
                    let used: HashSet<_> = assignment.grants().iter().map(|g| &g.role).collect();
                    prop_assert_eq!(used.len(), candidates.len());
                }
            }
        }

        #[test]
        fn exact_matching_succeeds_whenever_a_bijection_exists(
            masks in prop::collection::vec(0u8..32, 1..=5),
            seed in any::<u64>(),
        ) {
            let roles = catalog(5);
            let candidates = candidates_from(&masks, &roles);
            let mut rng = StdRng::seed_from_u64(seed);
            let exact = MatchingAssigner::new().assign(&candidates, &roles, &mut rng);

            let mut rng = StdRng::seed_from_u64(seed);
            match BoundedRetryAssigner::default().assign(&candidates, &roles, &mut rng) {
                Ok(_) => prop_assert!(exact.is_ok()),
                Err(err) => {
                    let exhausted = matches!(err.reason, InfeasibilityReason::AttemptsExhausted { .. });
                    prop_assert_eq!(exhausted, exact.is_ok());
                }
            }
        }

        #[test]
        fn unconstrained_input_always_assigns(n in 1usize..=5, seed in any::<u64>()) {
            let roles = catalog(5);
            let candidates = candidates_from(&vec![0b11111; n], &roles);
            for strategy in strategies() {
                let mut rng = StdRng::seed_from_u64(seed);
                prop_assert!(strategy.assign(&candidates, &roles, &mut rng).is_ok());
            }
        }
    }
}
