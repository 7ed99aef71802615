//! SessionMode - which input protocol a session runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Input protocol of a lottery session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Anyone picks a numbered token; a shuffle hands out roles at the draw.
    OpenLottery,
    /// Voice-scope members claim hidden tokens, each bound to one role.
    InstantPick,
    /// Voice-scope members toggle roles they refuse, then one execute draws.
    ExclusionThenLottery,
}

impl SessionMode {
    /// Whether participants join by picking a token.
    pub fn accepts_picks(&self) -> bool {
        matches!(self, SessionMode::OpenLottery | SessionMode::InstantPick)
    }

    /// Whether participants toggle exclusions.
    pub fn accepts_toggles(&self) -> bool {
        matches!(self, SessionMode::ExclusionThenLottery)
    }

    /// Whether an explicit execute signal starts the draw.
    pub fn accepts_execute(&self) -> bool {
        !matches!(self, SessionMode::InstantPick)
    }

    /// Whether the session is limited to a roster resolved at creation.
    pub fn uses_roster(&self) -> bool {
        !matches!(self, SessionMode::OpenLottery)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::OpenLottery => "open_lottery",
            SessionMode::InstantPick => "instant_pick",
            SessionMode::ExclusionThenLottery => "exclusion_then_lottery",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open_lottery" | "open" => Ok(SessionMode::OpenLottery),
            "instant_pick" | "instant" => Ok(SessionMode::InstantPick),
            "exclusion_then_lottery" | "exclusion" => Ok(SessionMode::ExclusionThenLottery),
            other => Err(ValidationError::invalid_format(
                "mode",
                format!("unknown session mode '{}'", other),
            )),
        }
    }
}
