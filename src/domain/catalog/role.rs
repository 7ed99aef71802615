//! Role value object: catalog key plus display metadata.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RoleId, ValidationError};

/// A role participants can be assigned.
///
/// Display fields are opaque to the core; only `id` and `affordance`
/// take part in session logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: String,
    /// Emoji used when announcing the role.
    badge: String,
    /// Token participants toggle to exclude this role.
    affordance: String,
    title: String,
    message: String,
    tip: String,
}

impl Role {
    /// Creates a role with a display name; flavor text starts empty.
    pub fn new(
        id: &str,
        name: impl Into<String>,
        affordance: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("role_name"));
        }
        let affordance = affordance.into();
        if affordance.trim().is_empty() {
            return Err(ValidationError::empty_field("role_affordance"));
        }
        Ok(Self {
            id: RoleId::new(id)?,
            title: name.clone(),
            name,
            badge: String::new(),
            affordance,
            message: String::new(),
            tip: String::new(),
        })
    }

    /// Adds the announcement badge, title, flavor message and tip.
    pub fn with_flavor(
        mut self,
        badge: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        tip: impl Into<String>,
    ) -> Self {
        self.badge = badge.into();
        self.title = title.into();
        self.message = message.into();
        self.tip = tip.into();
        self
    }

    pub fn id(&self) -> &RoleId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn badge(&self) -> &str {
        &self.badge
    }

    pub fn affordance(&self) -> &str {
        &self.affordance
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tip(&self) -> &str {
        &self.tip
    }

    /// Badge and name, e.g. `🏹 ADC`.
    pub fn label(&self) -> String {
        if self.badge.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.badge, self.name)
        }
    }
}
