//! RoleCatalog - ordered, immutable registry of roles.

use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashSet};

use super::Role;
use crate::domain::foundation::{RoleId, ValidationError};

/// The five lanes of the reference game, in display order.
static STANDARD_CATALOG: Lazy<RoleCatalog> = Lazy::new(|| {
    RoleCatalog::build_standard().expect("standard catalog definition is valid")
});

/// Immutable ordered set of roles.
///
/// # Invariants
///
/// - at least one role
/// - role ids are unique
/// - affordance tokens are unique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCatalog {
    roles: Vec<Role>,
}

impl RoleCatalog {
    /// Creates a catalog, validating its invariants.
    pub fn new(roles: Vec<Role>) -> Result<Self, ValidationError> {
        if roles.is_empty() {
            return Err(ValidationError::empty_field("catalog"));
        }
        let mut ids = HashSet::new();
        let mut affordances = HashSet::new();
        for role in &roles {
            if !ids.insert(role.id().clone()) {
                return Err(ValidationError::DuplicateRole(role.id().to_string()));
            }
            if !affordances.insert(role.affordance().to_string()) {
                return Err(ValidationError::invalid_format(
                    "role_affordance",
                    format!("'{}' is used by more than one role", role.affordance()),
                ));
            }
        }
        Ok(Self { roles })
    }

    /// Returns the shared reference catalog (top, jg, mid, adc, sup).
    pub fn standard() -> &'static RoleCatalog {
        &STANDARD_CATALOG
    }

    fn build_standard() -> Result<Self, ValidationError> {
        Self::new(vec![
            Role::new("top", "Top", "⚔️")?.with_flavor(
                "⚔️",
                "Top Laner",
                "Once top gets fed nobody can stop them. A heavy responsibility!",
                "Lock eyes, take the fight.",
            ),
            Role::new("jg", "Jungle", "🌲")?.with_flavor(
                "🌲",
                "Jungler",
                "The team's commander: control the whole map and lead the way to victory.",
                "Gank! Gank!",
            ),
            Role::new("mid", "Mid", "🪄")?.with_flavor(
                "⚡",
                "Mid Laner",
                "You are the core of the team. Carrying the game is your job!",
                "Make plays, make plays.",
            ),
            Role::new("adc", "ADC", "🏹")?.with_flavor(
                "🏹",
                "ADC",
                "If you don't deal damage, the team loses. No pressure!",
                "Damage! Damage!",
            ),
            Role::new("sup", "Support", "❤️")?.with_flavor(
                "🛡️",
                "Support",
                "Protect your allies and own the vision game.",
                "Never slack off.",
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Role ids in catalog order.
    pub fn role_ids(&self) -> Vec<RoleId> {
        self.roles.iter().map(|r| r.id().clone()).collect()
    }

    pub fn get(&self, id: &RoleId) -> Option<&Role> {
        self.roles.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &RoleId) -> bool {
        self.get(id).is_some()
    }

    /// Looks up the role whose exclusion affordance is `token`.
    pub fn by_affordance(&self, token: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.affordance() == token)
    }

    /// Resolves a user-supplied key (case-insensitive) to a catalog role id.
    pub fn parse_role(&self, key: &str) -> Result<RoleId, ValidationError> {
        let unknown = || ValidationError::unknown_role(key, self.roles.iter().map(|r| r.id().as_str()));
        let id = RoleId::new(key).map_err(|_| unknown())?;
        if self.contains(&id) {
            Ok(id)
        } else {
            Err(unknown())
        }
    }

    /// Parses a whitespace-separated list of role keys, e.g. `"top mid"`.
    ///
    /// Blank input yields an empty set.
    pub fn parse_exclusions(&self, input: &str) -> Result<BTreeSet<RoleId>, ValidationError> {
        input
            .split_whitespace()
            .map(|key| self.parse_role(key))
            .collect()
    }

    /// Roles left after removing `excluded`, in catalog order.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if every role is excluded
    pub fn available_after(&self, excluded: &BTreeSet<RoleId>) -> Result<Vec<RoleId>, ValidationError> {
        let available: Vec<RoleId> = self
            .roles
            .iter()
            .map(|r| r.id().clone())
            .filter(|id| !excluded.contains(id))
            .collect();
        if available.is_empty() {
            return Err(ValidationError::empty_field("available_roles"));
        }
        Ok(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(key: &str) -> RoleId {
        RoleId::new(key).unwrap()
    }

    #[test]
    fn standard_catalog_has_five_lanes_in_order() {
        let catalog = RoleCatalog::standard();
        let keys: Vec<String> = catalog.role_ids().into_iter().map(String::from).collect();
        assert_eq!(keys, vec!["top", "jg", "mid", "adc", "sup"]);
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert_eq!(
            RoleCatalog::new(vec![]),
            Err(ValidationError::empty_field("catalog"))
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let roles = vec![
            Role::new("top", "Top", "1").unwrap(),
            Role::new("TOP", "Top again", "2").unwrap(),
        ];
        assert_eq!(
            RoleCatalog::new(roles),
            Err(ValidationError::DuplicateRole("top".into()))
        );
    }

    #[test]
    fn duplicate_affordances_are_rejected() {
        let roles = vec![
            Role::new("a", "A", "x").unwrap(),
            Role::new("b", "B", "x").unwrap(),
        ];
        assert!(RoleCatalog::new(roles).is_err());
    }

    #[test]
    fn parse_exclusions_is_case_insensitive() {
        let catalog = RoleCatalog::standard();
        let excluded = catalog.parse_exclusions("TOP  mid").unwrap();
        assert_eq!(excluded, BTreeSet::from([id("top"), id("mid")]));
    }

    #[test]
    fn parse_exclusions_rejects_unknown_keys() {
        let err = RoleCatalog::standard().parse_exclusions("top support").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownRole { ref role, .. } if role == "support"));
        assert!(err.to_string().contains("top, jg, mid, adc, sup"));
    }

    #[test]
    fn blank_exclusions_parse_to_empty_set() {
        assert!(RoleCatalog::standard().parse_exclusions("   ").unwrap().is_empty());
    }

    #[test]
    fn available_after_keeps_catalog_order() {
        let catalog = RoleCatalog::standard();
        let available = catalog
            .available_after(&BTreeSet::from([id("jg"), id("adc")]))
            .unwrap();
        assert_eq!(available, vec![id("top"), id("mid"), id("sup")]);
    }

    #[test]
    fn available_after_fails_when_everything_excluded() {
        let catalog = RoleCatalog::standard();
        let all: BTreeSet<RoleId> = catalog.role_ids().into_iter().collect();
        assert!(catalog.available_after(&all).is_err());
    }

    #[test]
    fn by_affordance_finds_exclusion_token() {
        let catalog = RoleCatalog::standard();
        assert_eq!(catalog.by_affordance("🌲").map(|r| r.id().as_str()), Some("jg"));
        assert!(catalog.by_affordance("🎲").is_none());
    }
}
