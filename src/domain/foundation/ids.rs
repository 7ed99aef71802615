//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Identifier of a channel (text channel, private workspace, console).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(u64);

impl ChannelId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the message hosting a session's affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a lottery session.
///
/// Derived from the (channel, message) pair hosting the session, so two
/// active sessions can never share an id. Rendered as `channel_message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId {
    channel: ChannelId,
    message: MessageId,
}

impl SessionId {
    /// Creates the session id for a message posted in a channel.
    pub fn new(channel: ChannelId, message: MessageId) -> Self {
        Self { channel, message }
    }

    /// Returns the hosting channel.
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Returns the hosting message.
    pub fn message(&self) -> MessageId {
        self.message
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.channel, self.message)
    }
}

impl FromStr for SessionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::invalid_format("session_id", "expected <channel>_<message>");
        let (channel, message) = s.split_once('_').ok_or_else(invalid)?;
        let channel = channel.parse::<u64>().map_err(|_| invalid())?;
        let message = message.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self::new(ChannelId::new(channel), MessageId::new(message)))
    }
}

/// Opaque participant identity (typically the platform user id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Creates a new ParticipantId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("participant_id"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Catalog key of a role, e.g. `top` or `adc`.
///
/// Keys are lowercase ASCII letters, digits or underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleId(String);

impl RoleId {
    /// Creates a RoleId, normalizing to lowercase.
    pub fn new(key: impl AsRef<str>) -> Result<Self, ValidationError> {
        let key = key.as_ref().trim().to_lowercase();
        if key.is_empty() {
            return Err(ValidationError::empty_field("role_id"));
        }
        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ValidationError::invalid_format(
                "role_id",
                format!("'{}' may only contain letters, digits and '_'", key),
            ));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoleId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RoleId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleId> for String {
    fn from(id: RoleId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_displays_channel_and_message() {
        let id = SessionId::new(ChannelId::new(42), MessageId::new(7));
        assert_eq!(id.to_string(), "42_7");
    }

    #[test]
    fn session_id_parses_from_display_form() {
        let id: SessionId = "42_7".parse().unwrap();
        assert_eq!(id.channel(), ChannelId::new(42));
        assert_eq!(id.message(), MessageId::new(7));
    }

    #[test]
    fn session_id_rejects_malformed_input() {
        assert!("42".parse::<SessionId>().is_err());
        assert!("a_7".parse::<SessionId>().is_err());
        assert!("42_".parse::<SessionId>().is_err());
    }

    #[test]
    fn session_ids_differ_by_message() {
        let channel = ChannelId::new(1);
        assert_ne!(
            SessionId::new(channel, MessageId::new(1)),
            SessionId::new(channel, MessageId::new(2))
        );
    }

    #[test]
    fn participant_id_rejects_blank() {
        assert!(ParticipantId::new("").is_err());
        assert!(ParticipantId::new("   ").is_err());
        assert_eq!(ParticipantId::new("alice").unwrap().as_str(), "alice");
    }

    #[test]
    fn role_id_normalizes_case() {
        assert_eq!(RoleId::new("MID").unwrap().as_str(), "mid");
        assert_eq!(RoleId::new(" adc ").unwrap().as_str(), "adc");
    }

    #[test]
    fn role_id_rejects_symbols() {
        assert!(RoleId::new("top lane").is_err());
        assert!(RoleId::new("").is_err());
    }

    #[test]
    fn role_id_round_trips_through_json() {
        let id = RoleId::new("sup").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"sup\"");
        let back: RoleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<RoleId>("\"no way\"").is_err());
    }
}
