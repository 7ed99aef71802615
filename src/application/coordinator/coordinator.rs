//! SessionCoordinator - public entry point for running lottery sessions.
//!
//! The coordinator validates and opens sessions, spawns one task per
//! session and routes participant actions to it. It never mutates a
//! session itself; everything it reports comes from watch channels the
//! session task publishes into, or from the finished-session history.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::Instrument;

use super::action::{Ack, ActionKind};
use super::dispatcher::session_channels;
use super::runner::SessionRunner;
use super::settings::CoordinatorSettings;
use super::store::{ActiveSession, CurrentRole, FinishedSession, SessionStore};
use crate::domain::assignment::AssignmentStrategy;
use crate::domain::catalog::RoleCatalog;
use crate::domain::foundation::{ChannelId, ParticipantId, RoleId, SessionId, ValidationError};
use crate::domain::lottery::{
    LotteryError, SelectionSession, SessionDraft, SessionMode, SessionProgress, TerminalOutcome,
};
use crate::ports::{Clock, EventPublisher, PresentationAdapter, WorkspaceProvisioner};

/// Collaborators the coordinator talks to.
#[derive(Clone)]
pub struct CoordinatorPorts {
    pub presentation: Arc<dyn PresentationAdapter>,
    pub workspaces: Arc<dyn WorkspaceProvisioner>,
    pub publisher: Arc<dyn EventPublisher>,
    pub clock: Arc<dyn Clock>,
}

/// State shared between the coordinator and its session tasks.
pub(crate) struct Shared {
    pub settings: CoordinatorSettings,
    pub catalog: Arc<RoleCatalog>,
    pub strategy: Arc<dyn AssignmentStrategy>,
    pub presentation: Arc<dyn PresentationAdapter>,
    pub workspaces: Arc<dyn WorkspaceProvisioner>,
    pub publisher: Arc<dyn EventPublisher>,
    pub clock: Arc<dyn Clock>,
    pub store: SessionStore,
    pub shutdown: watch::Sender<bool>,
}

/// Request to open a session.
#[derive(Debug, Clone)]
pub struct SessionSpec {
    pub session_id: SessionId,
    pub mode: SessionMode,
    /// Catalog subset, in presentation order.
    pub available_roles: Vec<RoleId>,
    /// Eligible participants; ignored for open lotteries.
    pub roster: Vec<ParticipantId>,
    /// Scoped workspace to release after the grace period.
    pub workspace: Option<ChannelId>,
    /// Fixes every random choice of the session when set.
    pub seed: Option<u64>,
}

impl SessionSpec {
    pub fn new(session_id: SessionId, mode: SessionMode, available_roles: Vec<RoleId>) -> Self {
        Self {
            session_id,
            mode,
            available_roles,
            roster: Vec::new(),
            workspace: None,
            seed: None,
        }
    }

    pub fn with_roster(mut self, roster: Vec<ParticipantId>) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_workspace(mut self, workspace: ChannelId) -> Self {
        self.workspace = Some(workspace);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Caller's view of a session it created.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    mode: SessionMode,
    deadline: Instant,
    progress: watch::Receiver<SessionProgress>,
    outcome: watch::Receiver<Option<TerminalOutcome>>,
}

impl SessionHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Latest progress published by the session task.
    pub fn progress(&self) -> SessionProgress {
        self.progress.borrow().clone()
    }

    pub fn outcome(&self) -> Option<TerminalOutcome> {
        self.outcome.borrow().clone()
    }

    /// Waits for the terminal outcome. `None` only if the task died first.
    pub async fn wait(&self) -> Option<TerminalOutcome> {
        let mut outcome = self.outcome.clone();
        let resolved = outcome
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|current| (*current).clone());
        resolved
    }
}

/// Runs any number of independent sessions on the current Tokio runtime.
#[derive(Clone)]
pub struct SessionCoordinator {
    inner: Arc<Shared>,
}

impl SessionCoordinator {
    pub fn new(
        settings: CoordinatorSettings,
        catalog: Arc<RoleCatalog>,
        strategy: Arc<dyn AssignmentStrategy>,
        ports: CoordinatorPorts,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        let store = SessionStore::new(settings.history_limit);
        Self {
            inner: Arc::new(Shared {
                settings,
                catalog,
                strategy,
                presentation: ports.presentation,
                workspaces: ports.workspaces,
                publisher: ports.publisher,
                clock: ports.clock,
                store,
                shutdown,
            }),
        }
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.inner.settings
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.inner.catalog
    }

    pub fn strategy_name(&self) -> &'static str {
        self.inner.strategy.name()
    }

    /// Opens a session and spawns the task that drives it.
    ///
    /// Must be called from within a Tokio runtime. Validation failures
    /// leave nothing behind.
    pub fn create_session(&self, spec: SessionSpec) -> Result<SessionHandle, LotteryError> {
        if *self.inner.shutdown.borrow() {
            return Err(LotteryError::ShuttingDown);
        }
        for role in &spec.available_roles {
            if !self.inner.catalog.contains(role) {
                return Err(ValidationError::unknown_role(
                    role.as_str(),
                    self.inner.catalog.role_ids().iter().map(|r| r.as_str().to_string()),
                )
                .into());
            }
        }
        if self.inner.store.contains(&spec.session_id) {
            return Err(LotteryError::DuplicateSession(spec.session_id));
        }

        let mut rng = match spec.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let session = SelectionSession::open(
            SessionDraft {
                id: spec.session_id,
                mode: spec.mode,
                available_roles: spec.available_roles,
                roster: spec.roster,
                min_participants: self.inner.settings.exclusion_min_participants,
            },
            &mut rng,
        )?;

        let id = session.id();
        let mode = session.mode();
        let deadline = self.inner.clock.now() + self.inner.settings.input_timeout;
        let (inbox, receivers) = session_channels(self.inner.settings.event_buffer);
        let (progress_tx, progress) = watch::channel(session.progress());
        let (outcome_tx, outcome) = watch::channel(None);

        self.inner.store.insert(
            id,
            ActiveSession {
                mode,
                inbox,
                progress: progress.clone(),
                outcome: outcome.clone(),
                deadline,
            },
        )?;

        let runner = SessionRunner::new(
            session,
            Arc::clone(&self.inner),
            deadline,
            spec.workspace,
            rng,
            progress_tx,
            outcome_tx,
            self.inner.shutdown.subscribe(),
        );
        let span = tracing::info_span!("lottery_session", session_id = %id, mode = %mode);
        let task = tokio::spawn(runner.run(receivers).instrument(span));
        self.inner.store.attach_task(id, task);

        tracing::info!(
            session_id = %id,
            mode = %mode,
            timeout_secs = self.inner.settings.input_timeout.as_secs(),
            "session created"
        );

        Ok(SessionHandle {
            session_id: id,
            mode,
            deadline,
            progress,
            outcome,
        })
    }

    /// Routes an action to its session and waits for the verdict.
    pub async fn submit_event(
        &self,
        session_id: SessionId,
        actor: ParticipantId,
        action: ActionKind,
    ) -> Result<Ack, LotteryError> {
        let Some(active) = self.inner.store.active(&session_id) else {
            return Err(self.gone(session_id));
        };
        let finished = active.outcome.borrow().as_ref().map(TerminalOutcome::state);
        if let Some(state) = finished {
            return Err(LotteryError::SessionClosed(state));
        }

        tracing::debug!(session_id = %session_id, participant = %actor, action = %action, "routing action");
        let Ok(reply) = active.inbox.route(actor, action).await else {
            return Err(closed(&active));
        };
        match reply.await {
            Ok(result) => result,
            // Dropped unanswered: the session stopped collecting first.
            Err(_) => Err(closed(&active)),
        }
    }

    /// Current progress; `remaining` is set while input is open.
    pub fn session_state(&self, session_id: SessionId) -> Result<SessionProgress, LotteryError> {
        if let Some(active) = self.inner.store.active(&session_id) {
            let progress = active.progress.borrow().clone();
            let remaining = progress
                .state
                .is_collecting()
                .then(|| active.deadline.saturating_duration_since(self.inner.clock.now()));
            return Ok(progress.with_remaining(remaining));
        }
        self.inner
            .store
            .finished(&session_id)
            .map(|finished| finished.progress.clone())
            .ok_or(LotteryError::SessionNotFound(session_id))
    }

    /// Waits for the session's terminal outcome. Repeatable.
    pub async fn await_terminal(&self, session_id: SessionId) -> Result<TerminalOutcome, LotteryError> {
        if let Some(active) = self.inner.store.active(&session_id) {
            let mut outcome = active.outcome;
            let resolved = outcome
                .wait_for(Option::is_some)
                .await
                .ok()
                .and_then(|current| (*current).clone());
            if let Some(resolved) = resolved {
                return Ok(resolved);
            }
        }
        self.inner
            .store
            .finished(&session_id)
            .map(|finished| finished.outcome.clone())
            .ok_or(LotteryError::SessionNotFound(session_id))
    }

    pub async fn cancel(&self, session_id: SessionId, actor: ParticipantId) -> Result<Ack, LotteryError> {
        self.submit_event(session_id, actor, ActionKind::Cancel).await
    }

    /// The participant's role from their latest completed session.
    pub fn current_role(&self, participant: &ParticipantId) -> Option<CurrentRole> {
        self.inner.store.current_role(participant)
    }

    pub fn finished(&self, session_id: SessionId) -> Option<Arc<FinishedSession>> {
        self.inner.store.finished(&session_id)
    }

    /// Sessions not yet evicted, including those inside their grace period.
    pub fn active_sessions(&self) -> usize {
        self.inner.store.active_count()
    }

    pub fn input_timeout(&self) -> Duration {
        self.inner.settings.input_timeout
    }

    /// Cancels every collecting session, cuts grace periods short and
    /// waits for all session tasks to finish.
    pub async fn shutdown(&self) {
        self.inner.shutdown.send_replace(true);
        let tasks = self.inner.store.drain_tasks();
        tracing::info!(sessions = tasks.len(), "coordinator shutting down");
        for task in tasks {
            if let Err(err) = task.await {
                tracing::error!(error = %err, "session task ended abnormally");
            }
        }
    }

    fn gone(&self, session_id: SessionId) -> LotteryError {
        match self.inner.store.finished(&session_id) {
            Some(finished) => LotteryError::SessionClosed(finished.outcome.state()),
            None => LotteryError::SessionNotFound(session_id),
        }
    }
}

fn closed(active: &ActiveSession) -> LotteryError {
    let state = active.progress.borrow().state;
    LotteryError::SessionClosed(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{InMemoryWorkspaces, ReactionBoard};
    use crate::domain::assignment::MatchingAssigner;
    use crate::domain::foundation::MessageId;
    use crate::domain::lottery::{PickToken, SessionState};
    use crate::ports::TokioClock;

    struct Fixture {
        coordinator: SessionCoordinator,
        board: Arc<ReactionBoard>,
        bus: Arc<InMemoryEventBus>,
        workspaces: Arc<InMemoryWorkspaces>,
    }

    fn fixture(settings: CoordinatorSettings) -> Fixture {
        let board = Arc::new(ReactionBoard::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let workspaces = Arc::new(InMemoryWorkspaces::new());
        let coordinator = SessionCoordinator::new(
            settings,
            Arc::new(RoleCatalog::standard().clone()),
            Arc::new(MatchingAssigner::new()),
            CoordinatorPorts {
                presentation: board.clone(),
                workspaces: workspaces.clone(),
                publisher: bus.clone(),
                clock: Arc::new(TokioClock),
            },
        );
        Fixture {
            coordinator,
            board,
            bus,
            workspaces,
        }
    }

    fn quick() -> CoordinatorSettings {
        CoordinatorSettings::default()
            .with_draw_delay(Duration::ZERO)
            .with_grace_period(Duration::from_secs(30))
    }

    fn sid(message: u64) -> SessionId {
        SessionId::new(ChannelId::new(10), MessageId::new(message))
    }

    fn who(name: &str) -> ParticipantId {
        ParticipantId::new(name).unwrap()
    }

    fn role(key: &str) -> RoleId {
        RoleId::new(key).unwrap()
    }

    fn lanes(keys: &[&str]) -> Vec<RoleId> {
        keys.iter().map(|k| role(k)).collect()
    }

    fn token(n: u8) -> PickToken {
        PickToken::new(n).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn open_lottery_assigns_every_picker() {
        let f = fixture(quick());
        let spec = SessionSpec::new(sid(1), SessionMode::OpenLottery, lanes(&["top", "mid", "sup"]))
            .with_seed(3);
        f.coordinator.create_session(spec).unwrap();

        for (n, name) in ["alice", "bob"].iter().enumerate() {
            let ack = f
                .coordinator
                .submit_event(sid(1), who(name), ActionKind::Pick(token(n as u8 + 1)))
                .await
                .unwrap();
            assert!(matches!(ack, Ack::Joined { .. }));
        }
        let ack = f
            .coordinator
            .submit_event(sid(1), who("alice"), ActionKind::Execute)
            .await
            .unwrap();
        assert_eq!(ack, Ack::Locked);

        let outcome = f.coordinator.await_terminal(sid(1)).await.unwrap();
        let assignment = outcome.assignment().unwrap();
        assert_eq!(assignment.len(), 2);
        assert!(assignment.role_of(&who("alice")).is_some());
        assert!(assignment.role_of(&who("bob")).is_some());
        assert_ne!(
            assignment.role_of(&who("alice")),
            assignment.role_of(&who("bob"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_session_id_is_rejected() {
        let f = fixture(quick());
        let spec = SessionSpec::new(sid(2), SessionMode::OpenLottery, lanes(&["top"]));
        f.coordinator.create_session(spec.clone()).unwrap();
        assert_eq!(
            f.coordinator.create_session(spec).unwrap_err(),
            LotteryError::DuplicateSession(sid(2))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_role_is_rejected_before_anything_runs() {
        let f = fixture(quick());
        let spec = SessionSpec::new(sid(3), SessionMode::OpenLottery, lanes(&["top", "tank"]));
        let err = f.coordinator.create_session(spec).unwrap_err();
        assert!(matches!(err, LotteryError::Validation(ValidationError::UnknownRole { .. })));
        assert_eq!(f.coordinator.active_sessions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_session_refuses_further_input() {
        let f = fixture(quick());
        f.coordinator
            .create_session(SessionSpec::new(sid(4), SessionMode::OpenLottery, lanes(&["top", "mid"])))
            .unwrap();
        f.coordinator.cancel(sid(4), who("alice")).await.unwrap();

        let first = f.coordinator.await_terminal(sid(4)).await.unwrap();
        assert_eq!(first, TerminalOutcome::Cancelled);

        let err = f
            .coordinator
            .submit_event(sid(4), who("bob"), ActionKind::Pick(token(1)))
            .await
            .unwrap_err();
        assert_eq!(err, LotteryError::SessionClosed(SessionState::Cancelled));
        assert_eq!(f.coordinator.await_terminal(sid(4)).await.unwrap(), first);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_time_is_reported_while_collecting() {
        let f = fixture(quick());
        f.coordinator
            .create_session(SessionSpec::new(sid(5), SessionMode::OpenLottery, lanes(&["top"])))
            .unwrap();
        tokio::time::advance(Duration::from_secs(100)).await;

        let progress = f.coordinator.session_state(sid(5)).unwrap();
        assert_eq!(progress.state, SessionState::Collecting);
        assert_eq!(progress.remaining, Some(Duration::from_secs(200)));
    }

    #[tokio::test(start_paused = true)]
    async fn workspace_is_released_after_grace_period() {
        let f = fixture(quick());
        let workspace = ChannelId::new(77);
        f.workspaces.adopt(workspace);
        let spec = SessionSpec::new(sid(6), SessionMode::OpenLottery, lanes(&["top"]))
            .with_workspace(workspace);
        f.coordinator.create_session(spec).unwrap();
        f.coordinator.cancel(sid(6), who("alice")).await.unwrap();
        f.coordinator.await_terminal(sid(6)).await.unwrap();
        assert!(f.workspaces.is_open(workspace));

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(!f.workspaces.is_open(workspace));
        assert_eq!(f.coordinator.active_sessions(), 0);
        // Still answerable from history.
        assert_eq!(
            f.coordinator.session_state(sid(6)).unwrap().state,
            SessionState::Cancelled
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_live_sessions() {
        let f = fixture(quick());
        f.coordinator
            .create_session(SessionSpec::new(sid(7), SessionMode::OpenLottery, lanes(&["top"])))
            .unwrap();
        f.coordinator.shutdown().await;

        assert_eq!(
            f.coordinator.await_terminal(sid(7)).await.unwrap(),
            TerminalOutcome::Cancelled
        );
        assert_eq!(f.coordinator.active_sessions(), 0);
        let err = f
            .coordinator
            .create_session(SessionSpec::new(sid(8), SessionMode::OpenLottery, lanes(&["top"])))
            .unwrap_err();
        assert_eq!(err, LotteryError::ShuttingDown);
    }

    #[tokio::test(start_paused = true)]
    async fn lifecycle_events_are_published() {
        let f = fixture(quick());
        f.coordinator
            .create_session(SessionSpec::new(sid(9), SessionMode::OpenLottery, lanes(&["top"])))
            .unwrap();
        f.coordinator
            .submit_event(sid(9), who("alice"), ActionKind::Pick(token(1)))
            .await
            .unwrap();
        f.coordinator
            .submit_event(sid(9), who("alice"), ActionKind::Execute)
            .await
            .unwrap();
        f.coordinator.await_terminal(sid(9)).await.unwrap();

        let types: Vec<String> = f
            .bus
            .published_events()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(
            types,
            vec![
                "lottery.session_opened.v1",
                "lottery.pick_recorded.v1",
                "lottery.session_locked.v1",
                "lottery.roles_assigned.v1",
            ]
        );
        assert!(f.board.notices(sid(9)).len() >= 2);
    }
}
