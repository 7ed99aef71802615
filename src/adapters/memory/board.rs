//! ReactionBoard - PresentationAdapter that keeps messages and reactions in memory.
//!
//! The board plays the part of the chat surface: it remembers every posted
//! session message, the toggle reactions participants currently hold on it,
//! and every notice a session sent. An optional feed forwards notices as they
//! arrive, which is how the console prints them.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

use crate::domain::foundation::{ChannelId, DomainError, MessageId, ParticipantId, RoleId, SessionId};
use crate::ports::{Notice, PresentationAdapter, SessionAnnouncement};

/// A notice together with the session it belongs to.
pub type NoticeFeed = mpsc::UnboundedSender<(SessionId, Notice)>;

#[derive(Default)]
struct BoardState {
    announcements: HashMap<SessionId, SessionAnnouncement>,
    toggles: HashMap<(SessionId, ParticipantId), BTreeSet<RoleId>>,
    notices: HashMap<SessionId, Vec<Notice>>,
}

pub struct ReactionBoard {
    next_message: AtomicU64,
    state: Mutex<BoardState>,
    feed: Option<NoticeFeed>,
}

impl ReactionBoard {
    pub fn new() -> Self {
        Self {
            next_message: AtomicU64::new(1),
            state: Mutex::new(BoardState::default()),
            feed: None,
        }
    }

    /// Forwards every notice to `feed` as well as recording it.
    pub fn with_feed(mut self, feed: NoticeFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Adds or removes one toggle reaction, as the surface would when a
    /// participant clicks it. Returns whether anything changed.
    pub fn set_toggle(&self, session_id: SessionId, participant: &ParticipantId, role: &RoleId, on: bool) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let held = state
            .toggles
            .entry((session_id, participant.clone()))
            .or_default();
        if on {
            held.insert(role.clone())
        } else {
            held.remove(role)
        }
    }

    pub fn announcement(&self, session_id: SessionId) -> Option<SessionAnnouncement> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .announcements
            .get(&session_id)
            .cloned()
    }

    pub fn notices(&self, session_id: SessionId) -> Vec<Notice> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .notices
            .get(&session_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for ReactionBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresentationAdapter for ReactionBoard {
    async fn post_session(
        &self,
        channel: ChannelId,
        announcement: &SessionAnnouncement,
    ) -> Result<MessageId, DomainError> {
        let message = MessageId::new(self.next_message.fetch_add(1, Ordering::Relaxed));
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .announcements
            .insert(SessionId::new(channel, message), announcement.clone());
        Ok(message)
    }

    async fn notify(&self, session_id: SessionId, notice: Notice) -> Result<(), DomainError> {
        if let Some(feed) = &self.feed {
            // A closed feed only means nobody is printing anymore.
            let _ = feed.send((session_id, notice.clone()));
        }
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .notices
            .entry(session_id)
            .or_default()
            .push(notice);
        Ok(())
    }

    async fn current_toggles(
        &self,
        session_id: SessionId,
        participant: &ParticipantId,
    ) -> Result<BTreeSet<RoleId>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .toggles
            .get(&(session_id, participant.clone()))
            .cloned()
            .unwrap_or_default())
    }
}
