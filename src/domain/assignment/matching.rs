//! Exact assignment via augmenting paths (Kuhn's algorithm).
//!
//! Also used to explain why the bounded-retry strategy gave up: a failed
//! augmentation leaves behind a set of participants whose combined
//! permitted roles are fewer than their headcount.

use rand::seq::SliceRandom;
use rand::RngCore;

use super::{
    build_assignment, screen, Assignment, AssignmentStrategy, Candidate, InfeasibilityReason,
    Infeasible,
};
use crate::domain::foundation::RoleId;

/// Finds a bijection whenever one exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingAssigner;

impl MatchingAssigner {
    pub fn new() -> Self {
        Self
    }
}

impl AssignmentStrategy for MatchingAssigner {
    fn assign(
        &self,
        candidates: &[Candidate],
        catalog: &[RoleId],
        rng: &mut dyn RngCore,
    ) -> Result<Assignment, Infeasible> {
        screen(candidates, catalog)?;

        let mut graph = Bipartite::new(candidates, catalog);
        for options in &mut graph.adjacency {
            options.shuffle(&mut *rng);
        }
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.shuffle(&mut *rng);

        match graph.solve(&order) {
            Matching::Perfect(slots) => {
                let chosen: Vec<&RoleId> = slots.iter().map(|&r| graph.roles[r]).collect();
                build_assignment(candidates, &chosen, 1)
            }
            Matching::Deficient { participants, roles } => Err(Infeasible::after(
                graph.over_constrained(candidates, &participants, &roles),
                1,
            )),
        }
    }

    fn name(&self) -> &'static str {
        "exact"
    }
}

/// Names the cause of a failed assignment that passed [`screen`].
///
/// Returns `AttemptsExhausted` when a bijection does exist.
pub(super) fn diagnose(
    candidates: &[Candidate],
    catalog: &[RoleId],
    attempts: u32,
) -> InfeasibilityReason {
    if let Err(infeasible) = screen(candidates, catalog) {
        return infeasible.reason;
    }
    let graph = Bipartite::new(candidates, catalog);
    let order: Vec<usize> = (0..candidates.len()).collect();
    match graph.solve(&order) {
        Matching::Perfect(_) => InfeasibilityReason::AttemptsExhausted { attempts },
        Matching::Deficient { participants, roles } => {
            graph.over_constrained(candidates, &participants, &roles)
        }
    }
}

enum Matching {
    /// Role index per participant, in input order.
    Perfect(Vec<usize>),
    /// A Hall violator: `roles` is exactly the neighborhood of `participants`
    /// and has one element fewer.
    Deficient {
        participants: Vec<usize>,
        roles: Vec<usize>,
    },
}

struct Bipartite<'a> {
    /// Distinct catalog roles in catalog order.
    roles: Vec<&'a RoleId>,
    /// Permitted role indices per participant.
    adjacency: Vec<Vec<usize>>,
}

impl<'a> Bipartite<'a> {
    fn new(candidates: &[Candidate], catalog: &'a [RoleId]) -> Self {
        let mut roles: Vec<&'a RoleId> = Vec::with_capacity(catalog.len());
        for role in catalog {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        let adjacency = candidates
            .iter()
            .map(|c| {
                roles
                    .iter()
                    .enumerate()
                    .filter(|(_, role)| c.permits(role))
                    .map(|(idx, _)| idx)
                    .collect()
            })
            .collect();
        Self { roles, adjacency }
    }

    fn solve(&self, order: &[usize]) -> Matching {
        let mut owner: Vec<Option<usize>> = vec![None; self.roles.len()];
        for &participant in order {
            let mut seen_roles = vec![false; self.roles.len()];
            let mut seen_participants = vec![false; self.adjacency.len()];
            if !self.augment(
                participant,
                &mut owner,
                &mut seen_roles,
                &mut seen_participants,
            ) {
                return Matching::Deficient {
                    participants: marked(&seen_participants),
                    roles: marked(&seen_roles),
                };
            }
        }

        let mut slots = vec![0; self.adjacency.len()];
        for (role, holder) in owner.iter().enumerate() {
            if let Some(participant) = holder {
                slots[*participant] = role;
            }
        }
        Matching::Perfect(slots)
    }

    fn augment(
        &self,
        participant: usize,
        owner: &mut [Option<usize>],
        seen_roles: &mut [bool],
        seen_participants: &mut [bool],
    ) -> bool {
        seen_participants[participant] = true;
        for &role in &self.adjacency[participant] {
            if seen_roles[role] {
                continue;
            }
            seen_roles[role] = true;
            let free = match owner[role] {
                None => true,
                Some(holder) => self.augment(holder, owner, seen_roles, seen_participants),
            };
            if free {
                owner[role] = Some(participant);
                return true;
            }
        }
        false
    }

    fn over_constrained(
        &self,
        candidates: &[Candidate],
        participants: &[usize],
        roles: &[usize],
    ) -> InfeasibilityReason {
        InfeasibilityReason::OverConstrained {
            participants: participants
                .iter()
                .map(|&idx| candidates[idx].participant().clone())
                .collect(),
            roles: roles.iter().map(|&idx| self.roles[idx].clone()).collect(),
        }
    }
}

fn marked(flags: &[bool]) -> Vec<usize> {
    flags
        .iter()
        .enumerate()
        .filter(|(_, seen)| **seen)
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ParticipantId;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn r(key: &str) -> RoleId {
        RoleId::new(key).unwrap()
    }

    fn candidate(name: &str, permitted: &[&str]) -> Candidate {
        Candidate::new(
            ParticipantId::new(name).unwrap(),
            permitted.iter().map(|k| r(k)).collect::<BTreeSet<_>>(),
        )
    }

    fn abc() -> Vec<RoleId> {
        vec![r("a"), r("b"), r("c")]
    }

    #[test]
    fn finds_the_only_bijection() {
        let candidates = vec![
            candidate("p1", &["a", "b"]),
            candidate("p2", &["a"]),
            candidate("p3", &["b", "c"]),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let assignment = MatchingAssigner
            .assign(&candidates, &abc(), &mut rng)
            .unwrap();

        assert!(assignment.honors(&candidates));
        assert_eq!(assignment.role_of(candidates[1].participant()), Some(&r("a")));
        assert_eq!(assignment.role_of(candidates[0].participant()), Some(&r("b")));
        assert_eq!(assignment.role_of(candidates[2].participant()), Some(&r("c")));
        assert_eq!(assignment.attempts(), 1);
    }

    #[test]
    fn reports_hall_violator() {
        let candidates = vec![
            candidate("p1", &["a"]),
            candidate("p2", &["a"]),
            candidate("p3", &["b", "c"]),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let err = MatchingAssigner
            .assign(&candidates, &abc(), &mut rng)
            .unwrap_err();

        assert_eq!(
            err.reason,
            InfeasibilityReason::OverConstrained {
                participants: vec![
                    ParticipantId::new("p1").unwrap(),
                    ParticipantId::new("p2").unwrap()
                ],
                roles: vec![r("a")],
            }
        );
    }

    #[test]
    fn diagnose_reports_exhaustion_when_matching_exists() {
        let candidates = vec![candidate("p1", &["a"]), candidate("p2", &["b"])];
        assert_eq!(
            diagnose(&candidates, &abc(), 100),
            InfeasibilityReason::AttemptsExhausted { attempts: 100 }
        );
    }

    #[test]
    fn roles_outside_catalog_are_ignored() {
        let candidates = vec![candidate("p1", &["z"])];
        let mut rng = StdRng::seed_from_u64(3);
        let err = MatchingAssigner
            .assign(&candidates, &abc(), &mut rng)
            .unwrap_err();
        assert!(matches!(
            err.reason,
            InfeasibilityReason::EmptyPermittedSet { .. }
        ));
        assert_eq!(err.attempts, 0);
    }
}
