//! Pick tokens and recorded picks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{ParticipantId, ValidationError};

/// Highest token a session can offer.
pub const MAX_TOKENS: u8 = 20;

/// A selectable ordinal affordance, `1..=n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickToken(u8);

impl PickToken {
    pub fn new(ordinal: u8) -> Result<Self, ValidationError> {
        if ordinal == 0 || ordinal > MAX_TOKENS {
            return Err(ValidationError::out_of_range(
                "pick_token",
                1,
                MAX_TOKENS as usize,
                ordinal as usize,
            ));
        }
        Ok(Self(ordinal))
    }

    /// Token for a zero-based slot index.
    pub(crate) fn from_index(index: usize) -> Self {
        Self((index + 1) as u8)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Zero-based slot index.
    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }
}

impl fmt::Display for PickToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PickToken {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ordinal = s
            .trim()
            .parse::<u8>()
            .map_err(|_| ValidationError::invalid_format("pick_token", "expected a number"))?;
        Self::new(ordinal)
    }
}

/// A participant's accepted pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub participant: ParticipantId,
    pub token: PickToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_one_based() {
        assert!(PickToken::new(0).is_err());
        let token = PickToken::new(3).unwrap();
        assert_eq!(token.index(), 2);
        assert_eq!(PickToken::from_index(2), token);
    }

    #[test]
    fn parses_from_text() {
        assert_eq!(" 5 ".parse::<PickToken>().unwrap().get(), 5);
        assert!("five".parse::<PickToken>().is_err());
        assert!("21".parse::<PickToken>().is_err());
    }
}
