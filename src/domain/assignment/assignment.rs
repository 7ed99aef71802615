//! Assignment inputs and results.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::domain::foundation::{ParticipantId, RoleId, ValidationError};

/// A participant together with the roles they are willing to take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    participant: ParticipantId,
    permitted: BTreeSet<RoleId>,
}

impl Candidate {
    pub fn new(participant: ParticipantId, permitted: BTreeSet<RoleId>) -> Self {
        Self {
            participant,
            permitted,
        }
    }

    /// Builds the permitted set as `roles` minus `excluded`.
    pub fn from_exclusions(
        participant: ParticipantId,
        excluded: &BTreeSet<RoleId>,
        roles: &[RoleId],
    ) -> Self {
        let permitted = roles
            .iter()
            .filter(|r| !excluded.contains(*r))
            .cloned()
            .collect();
        Self::new(participant, permitted)
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn permitted(&self) -> &BTreeSet<RoleId> {
        &self.permitted
    }

    /// Whether `role` is acceptable to this participant.
    pub fn permits(&self, role: &RoleId) -> bool {
        self.permitted.contains(role)
    }
}

/// One participant → role pairing within an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleGrant {
    pub participant: ParticipantId,
    pub role: RoleId,
}

/// A finalized participant → role bijection.
///
/// # Invariants
///
/// - no participant appears twice
/// - no role appears twice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    grants: Vec<RoleGrant>,
    /// Attempts the strategy consumed to find this assignment.
    attempts: u32,
}

impl Assignment {
    /// Builds an assignment, rejecting anything that is not a bijection.
    pub fn from_grants(grants: Vec<RoleGrant>, attempts: u32) -> Result<Self, ValidationError> {
        let mut participants = HashSet::new();
        let mut roles = HashSet::new();
        for grant in &grants {
            if !participants.insert(&grant.participant) {
                return Err(ValidationError::DuplicateParticipant(
                    grant.participant.to_string(),
                ));
            }
            if !roles.insert(&grant.role) {
                return Err(ValidationError::DuplicateRole(grant.role.to_string()));
            }
        }
        Ok(Self { grants, attempts })
    }

    pub fn grants(&self) -> &[RoleGrant] {
        &self.grants
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Returns the role given to `participant`, if any.
    pub fn role_of(&self, participant: &ParticipantId) -> Option<&RoleId> {
        self.grants
            .iter()
            .find(|g| &g.participant == participant)
            .map(|g| &g.role)
    }

    /// Checks every grant against the candidates' permitted sets.
    ///
    /// True only when each candidate received exactly one permitted role.
    pub fn honors(&self, candidates: &[Candidate]) -> bool {
        self.grants.len() == candidates.len()
            && candidates.iter().all(|c| {
                self.role_of(c.participant())
                    .map(|role| c.permits(role))
                    .unwrap_or(false)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str) -> ParticipantId {
        ParticipantId::new(name).unwrap()
    }

    fn r(key: &str) -> RoleId {
        RoleId::new(key).unwrap()
    }

    fn grant(name: &str, key: &str) -> RoleGrant {
        RoleGrant {
            participant: p(name),
            role: r(key),
        }
    }

    #[test]
    fn from_exclusions_subtracts_from_roles() {
        let roles = vec![r("a"), r("b"), r("c")];
        let candidate = Candidate::from_exclusions(p("p1"), &BTreeSet::from([r("b")]), &roles);
        assert_eq!(candidate.permitted(), &BTreeSet::from([r("a"), r("c")]));
    }

    #[test]
    fn assignment_rejects_repeated_role() {
        let result = Assignment::from_grants(vec![grant("p1", "a"), grant("p2", "a")], 1);
        assert_eq!(result, Err(ValidationError::DuplicateRole("a".into())));
    }

    #[test]
    fn assignment_rejects_repeated_participant() {
        let result = Assignment::from_grants(vec![grant("p1", "a"), grant("p1", "b")], 1);
        assert_eq!(result, Err(ValidationError::DuplicateParticipant("p1".into())));
    }

    #[test]
    fn honors_checks_permitted_sets() {
        let candidates = vec![
            Candidate::new(p("p1"), BTreeSet::from([r("a")])),
            Candidate::new(p("p2"), BTreeSet::from([r("b")])),
        ];
        let good = Assignment::from_grants(vec![grant("p1", "a"), grant("p2", "b")], 1).unwrap();
        let bad = Assignment::from_grants(vec![grant("p1", "b"), grant("p2", "a")], 1).unwrap();
        let partial = Assignment::from_grants(vec![grant("p1", "a")], 1).unwrap();

        assert!(good.honors(&candidates));
        assert!(!bad.honors(&candidates));
        assert!(!partial.honors(&candidates));
    }

    #[test]
    fn role_of_finds_grant() {
        let assignment = Assignment::from_grants(vec![grant("p1", "a")], 3).unwrap();
        assert_eq!(assignment.role_of(&p("p1")), Some(&r("a")));
        assert_eq!(assignment.role_of(&p("p2")), None);
        assert_eq!(assignment.attempts(), 3);
    }
}
