//! StaticDirectory - ParticipantDirectory backed by in-process tables.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use crate::domain::foundation::{ChannelId, DomainError, ParticipantId};
use crate::ports::{ParticipantDirectory, VoiceScope};

/// Voice channels and bot accounts, set up by the caller.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    scopes: RwLock<HashMap<ChannelId, VoiceScope>>,
    bots: RwLock<HashSet<ParticipantId>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the members of voice channel `channel`.
    pub fn seat_voice(&self, name: impl Into<String>, channel: ChannelId, members: Vec<ParticipantId>) {
        let scope = VoiceScope {
            name: name.into(),
            channel,
            members,
        };
        self.scopes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(channel, scope);
    }

    pub fn clear_voice(&self, channel: ChannelId) {
        self.scopes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&channel);
    }

    pub fn mark_bot(&self, participant: ParticipantId) {
        self.bots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(participant);
    }

    fn bot(&self, participant: &ParticipantId) -> bool {
        self.bots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(participant)
    }
}

#[async_trait]
impl ParticipantDirectory for StaticDirectory {
    async fn voice_scope(&self, initiator: &ParticipantId) -> Result<Option<VoiceScope>, DomainError> {
        let found = self
            .scopes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .find(|scope| scope.members.contains(initiator))
            .cloned();

        Ok(found.map(|mut scope| {
            scope.members.retain(|member| !self.bot(member));
            scope
        }))
    }

    async fn is_bot(&self, participant: &ParticipantId) -> Result<bool, DomainError> {
        Ok(self.bot(participant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn who(name: &str) -> ParticipantId {
        ParticipantId::new(name).unwrap()
    }

    #[tokio::test]
    async fn scope_is_found_by_membership_without_bots() {
        let directory = StaticDirectory::new();
        directory.mark_bot(who("musicbot"));
        directory.seat_voice("ranked", ChannelId::new(5), vec![who("alice"), who("musicbot"), who("bob")]);

        let scope = directory.voice_scope(&who("bob")).await.unwrap().unwrap();
        assert_eq!(scope.name, "ranked");
        assert_eq!(scope.members, vec![who("alice"), who("bob")]);
        assert!(directory.voice_scope(&who("carol")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reseating_replaces_members() {
        let directory = StaticDirectory::new();
        directory.seat_voice("ranked", ChannelId::new(5), vec![who("alice")]);
        directory.seat_voice("ranked", ChannelId::new(5), vec![who("bob")]);
        assert!(directory.voice_scope(&who("alice")).await.unwrap().is_none());

        directory.clear_voice(ChannelId::new(5));
        assert!(directory.voice_scope(&who("bob")).await.unwrap().is_none());
    }
}
