//! SessionStore - explicit table of live sessions plus recent results.
//!
//! Owned by the coordinator. Entries are inserted on creation and evicted by
//! the session task itself once its grace period has passed.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::dispatcher::SessionInbox;
use crate::domain::assignment::Assignment;
use crate::domain::foundation::{ParticipantId, RoleId, SessionId, Timestamp};
use crate::domain::lottery::{LotteryError, SessionMode, SessionProgress, TerminalOutcome};

/// Read side of a live session, cheap to clone.
#[derive(Debug, Clone)]
pub(crate) struct ActiveSession {
    pub mode: SessionMode,
    pub inbox: SessionInbox,
    pub progress: watch::Receiver<SessionProgress>,
    pub outcome: watch::Receiver<Option<TerminalOutcome>>,
    pub deadline: Instant,
}

#[derive(Debug)]
struct Slot {
    session: ActiveSession,
    task: Option<JoinHandle<()>>,
}

/// A session that reached a terminal state.
#[derive(Debug, Clone)]
pub struct FinishedSession {
    pub session_id: SessionId,
    pub outcome: TerminalOutcome,
    pub progress: SessionProgress,
    pub finished_at: Timestamp,
}

impl FinishedSession {
    pub fn assignment(&self) -> Option<&Arc<Assignment>> {
        self.outcome.assignment()
    }
}

/// A participant's role from their most recent completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentRole {
    pub session_id: SessionId,
    pub role: RoleId,
    pub assigned_at: Timestamp,
}

pub(crate) struct SessionStore {
    active: Mutex<HashMap<SessionId, Slot>>,
    /// Newest first, capped at `history_limit`.
    history: RwLock<VecDeque<Arc<FinishedSession>>>,
    history_limit: usize,
}

impl SessionStore {
    pub fn new(history_limit: usize) -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            history: RwLock::new(VecDeque::new()),
            history_limit: history_limit.max(1),
        }
    }

    pub fn insert(&self, id: SessionId, session: ActiveSession) -> Result<(), LotteryError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if active.contains_key(&id) {
            return Err(LotteryError::DuplicateSession(id));
        }
        active.insert(
            id,
            Slot {
                session,
                task: None,
            },
        );
        Ok(())
    }

    /// Remembers the task driving `id`; dropped if the session is already gone.
    pub fn attach_task(&self, id: SessionId, task: JoinHandle<()>) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = active.get_mut(&id) {
            slot.task = Some(task);
        }
    }

    pub fn active(&self, id: &SessionId) -> Option<ActiveSession> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|slot| slot.session.clone())
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Removes a live session. Returns whether it was present.
    pub fn evict(&self, id: &SessionId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    /// Takes every task handle so the caller can await them.
    pub fn drain_tasks(&self) -> Vec<JoinHandle<()>> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values_mut()
            .filter_map(|slot| slot.task.take())
            .collect()
    }

    pub fn record_finished(&self, finished: FinishedSession) {
        let mut history = self.history.write().unwrap_or_else(PoisonError::into_inner);
        history.push_front(Arc::new(finished));
        history.truncate(self.history_limit);
    }

    pub fn finished(&self, id: &SessionId) -> Option<Arc<FinishedSession>> {
        self.snapshot().into_iter().find(|f| &f.session_id == id)
    }

    /// Copies the history so scans run without holding the lock.
    pub fn snapshot(&self) -> Vec<Arc<FinishedSession>> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Most recent completed role for `participant`.
    pub fn current_role(&self, participant: &ParticipantId) -> Option<CurrentRole> {
        self.snapshot().into_iter().find_map(|finished| {
            finished
                .assignment()
                .and_then(|a| a.role_of(participant))
                .map(|role| CurrentRole {
                    session_id: finished.session_id,
                    role: role.clone(),
                    assigned_at: finished.finished_at,
                })
        })
    }
}
