//! SessionRunner - the one task that owns and drives a session.
//!
//! All transitions of a session happen here, one event at a time. While
//! collecting, the task races its action channel against the input
//! deadline and shutdown in a single `select!`. Actions are applied in
//! submission order; anything still queued when input closes is dropped
//! unanswered.

use rand::rngs::StdRng;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{sleep, sleep_until, Instant};

use super::action::{Ack, ActionEvent};
use super::coordinator::Shared;
use super::dispatcher::{InboxReceivers, PickEvent, SessionAction, SignalEvent, ToggleEvent};
use super::store::FinishedSession;
use crate::domain::assignment::{shuffle_draw, Assignment, InfeasibilityReason, Infeasible};
use crate::domain::foundation::{ChannelId, ParticipantId, SessionId, Timestamp, ValidationError};
use crate::domain::lottery::{
    DrawInput, LotteryError, PickOutcome, SelectionSession, SessionMode, SessionProgress,
    SessionState, TerminalOutcome,
};
use crate::ports::Notice;

pub(crate) struct SessionRunner {
    session: SelectionSession,
    shared: Arc<Shared>,
    deadline: Instant,
    workspace: Option<ChannelId>,
    rng: StdRng,
    progress_tx: watch::Sender<SessionProgress>,
    outcome_tx: watch::Sender<Option<TerminalOutcome>>,
    shutdown: watch::Receiver<bool>,
}

impl SessionRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: SelectionSession,
        shared: Arc<Shared>,
        deadline: Instant,
        workspace: Option<ChannelId>,
        rng: StdRng,
        progress_tx: watch::Sender<SessionProgress>,
        outcome_tx: watch::Sender<Option<TerminalOutcome>>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            session,
            shared,
            deadline,
            workspace,
            rng,
            progress_tx,
            outcome_tx,
            shutdown,
        }
    }

    fn id(&self) -> SessionId {
        self.session.id()
    }

    /// Runs the session to a terminal state, then waits out the grace
    /// period, releases the workspace and evicts the session.
    pub async fn run(mut self, mut inbox: InboxReceivers) {
        self.flush_events(None).await;
        self.collect(&mut inbox).await;
        // Anything still queued is answered with "session closed".
        drop(inbox);

        if self.session.state() == SessionState::Locking {
            self.draw().await;
        }
        self.finish().await;
    }

    async fn collect(&mut self, inbox: &mut InboxReceivers) {
        let deadline = sleep_until(self.deadline);
        tokio::pin!(deadline);
        let mut shutdown = self.shutdown.clone();

        while self.session.state().is_collecting() {
            tokio::select! {
                biased;

                _ = &mut deadline => self.on_deadline(),
                _ = shutdown_signal(&mut shutdown) => self.on_shutdown(),
                Some(action) = inbox.actions.recv() => self.apply(action).await,
            }
            self.publish_progress();
        }
    }

    async fn apply(&mut self, action: SessionAction) {
        tracing::trace!(session_id = %self.id(), participant = %action.actor(), "applying action");
        match action {
            SessionAction::Pick(event) => self.on_pick(event).await,
            SessionAction::ToggleAdd(event) | SessionAction::ToggleRemove(event) => {
                self.on_toggle(event).await
            }
            SessionAction::Execute(event) => self.on_execute(event).await,
            SessionAction::Cancel(event) => self.on_cancel(event).await,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Collecting
    // ─────────────────────────────────────────────────────────────────────────

    fn on_deadline(&mut self) {
        match self.session.time_out() {
            Ok(()) => tracing::info!(session_id = %self.id(), "input deadline reached"),
            Err(err) => tracing::error!(session_id = %self.id(), error = %err, "timeout rejected"),
        }
    }

    fn on_shutdown(&mut self) {
        match self.session.cancel(None) {
            Ok(()) => tracing::info!(session_id = %self.id(), "cancelled by shutdown"),
            Err(err) => tracing::error!(session_id = %self.id(), error = %err, "shutdown cancel rejected"),
        }
    }

    async fn on_pick(&mut self, event: PickEvent) {
        let actor = event.actor.clone();
        match self.session.record_pick(&actor, event.payload) {
            Ok(PickOutcome::Joined {
                token,
                joined,
                capacity,
            }) => {
                event.respond(Ok(Ack::Joined {
                    token,
                    joined,
                    capacity,
                }));
                let progress = self.session.progress();
                self.notify(Notice::Joined {
                    participant: actor.clone(),
                    token,
                    progress,
                })
                .await;
            }
            Ok(PickOutcome::Claimed {
                token,
                role,
                claimed,
                total,
            }) => {
                event.respond(Ok(Ack::Claimed {
                    token,
                    role: role.clone(),
                    claimed,
                    total,
                }));
                let progress = self.session.progress();
                self.notify(Notice::RoleClaimed {
                    participant: actor.clone(),
                    token,
                    role,
                    progress,
                })
                .await;
                if self.session.all_claimed() {
                    if let Err(err) = self.session.lock() {
                        tracing::error!(session_id = %self.id(), error = %err, "lock after last claim failed");
                    }
                }
            }
            Ok(PickOutcome::AlreadyPicked) => {
                tracing::debug!(session_id = %self.id(), participant = %actor, "duplicate pick ignored");
                event.respond(Ok(Ack::AlreadyPicked));
            }
            Err(err) => self.reject(event, err).await,
        }
        self.flush_events(Some(&actor)).await;
    }

    async fn on_toggle(&mut self, event: ToggleEvent) {
        let actor = event.actor.clone();
        if !self.session.available_roles().contains(&event.payload) {
            let err = LotteryError::Validation(ValidationError::unknown_role(
                event.payload.as_str(),
                self.session.available_roles().iter().map(|r| r.as_str()),
            ));
            self.reject(event, err).await;
            return;
        }

        // The event only says "look again"; the surface holds the truth.
        let toggles = match self
            .shared
            .presentation
            .current_toggles(self.id(), &actor)
            .await
        {
            Ok(toggles) => toggles,
            Err(err) => {
                tracing::warn!(session_id = %self.id(), participant = %actor, error = %err, "toggle re-fetch failed");
                event.respond(Err(err.into()));
                return;
            }
        };

        match self.session.apply_exclusions(&actor, toggles.clone()) {
            Ok(changed) => {
                tracing::debug!(
                    session_id = %self.id(),
                    participant = %actor,
                    excluded = toggles.len(),
                    changed,
                    "exclusions reconciled"
                );
                event.respond(Ok(Ack::Exclusions {
                    excluded: toggles,
                    changed,
                }));
            }
            Err(err) => self.reject(event, err).await,
        }
        self.flush_events(Some(&actor)).await;
    }

    async fn on_execute(&mut self, event: SignalEvent) {
        let actor = event.actor.clone();
        match self.session.execute(&actor) {
            Ok(()) => {
                tracing::info!(session_id = %self.id(), participant = %actor, "draw requested");
                event.respond(Ok(Ack::Locked));
            }
            Err(err) => self.reject(event, err).await,
        }
        self.flush_events(Some(&actor)).await;
    }

    async fn on_cancel(&mut self, event: SignalEvent) {
        let actor = event.actor.clone();
        match self.session.cancel(Some(&actor)) {
            Ok(()) => {
                tracing::info!(session_id = %self.id(), participant = %actor, "session cancelled");
                event.respond(Ok(Ack::Cancelled));
            }
            Err(err) => self.reject(event, err).await,
        }
        self.flush_events(Some(&actor)).await;
    }

    async fn reject<T>(&self, event: ActionEvent<T>, reason: LotteryError) {
        tracing::debug!(
            session_id = %self.id(),
            participant = %event.actor,
            code = %reason.code(),
            "action rejected"
        );
        self.notify(Notice::Rejected {
            participant: event.actor.clone(),
            reason: reason.clone(),
        })
        .await;
        event.respond(Err(reason));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Draw
    // ─────────────────────────────────────────────────────────────────────────

    async fn draw(&mut self) {
        if self.session.mode() != SessionMode::InstantPick {
            let participants = self.session.progress().joined();
            self.notify(Notice::Drawing { participants }).await;
            self.flush_events(None).await;
            if !self.shared.settings.draw_delay.is_zero() {
                sleep(self.shared.settings.draw_delay).await;
            }
        }

        let input = match self.session.begin_assignment() {
            Ok(input) => input,
            Err(err) => {
                tracing::error!(session_id = %self.id(), error = %err, "could not start assignment");
                return;
            }
        };
        self.publish_progress();

        let roles = self.session.available_roles().to_vec();
        let strategy = Arc::clone(&self.shared.strategy);
        let rng = &mut self.rng;
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| match input {
            DrawInput::Shuffle(participants) => shuffle_draw(&participants, &roles, rng),
            DrawInput::Constrained(candidates) => strategy.assign(&candidates, &roles, rng),
            DrawInput::Claimed(grants) => Assignment::from_grants(grants, 1).map_err(|err| {
                tracing::error!(error = %err, "claims do not form an assignment");
                Infeasible::after(InfeasibilityReason::Internal, 1)
            }),
        }));
        let result = attempt.unwrap_or_else(|_| {
            tracing::error!(session_id = %self.id(), strategy = strategy.name(), "assignment panicked");
            Err(Infeasible::immediate(InfeasibilityReason::Internal))
        });

        match result {
            Ok(assignment) => {
                tracing::info!(
                    session_id = %self.id(),
                    participants = assignment.len(),
                    attempts = assignment.attempts(),
                    "roles assigned"
                );
                if let Err(err) = self.session.complete(assignment) {
                    tracing::error!(session_id = %self.id(), error = %err, "assignment rejected by session");
                    self.fail(Infeasible::immediate(InfeasibilityReason::Internal));
                }
            }
            Err(infeasible) => {
                tracing::info!(
                    session_id = %self.id(),
                    reason = %infeasible.reason,
                    attempts = infeasible.attempts,
                    "assignment infeasible"
                );
                self.fail(infeasible);
            }
        }
    }

    fn fail(&mut self, infeasible: Infeasible) {
        if let Err(err) = self.session.fail(infeasible) {
            tracing::error!(session_id = %self.id(), error = %err, "could not record failure");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Teardown
    // ─────────────────────────────────────────────────────────────────────────

    async fn finish(mut self) {
        let id = self.id();
        self.flush_events(None).await;

        let Some(outcome) = self.session.outcome().cloned() else {
            tracing::error!(session_id = %id, state = %self.session.state(), "session stopped without an outcome");
            self.publish_progress();
            self.shared.store.evict(&id);
            return;
        };

        let progress = self.session.progress();
        self.shared.store.record_finished(FinishedSession {
            session_id: id,
            outcome: outcome.clone(),
            progress: progress.clone(),
            finished_at: Timestamp::now(),
        });
        self.progress_tx.send_replace(progress.clone());
        self.outcome_tx.send_replace(Some(outcome.clone()));
        tracing::info!(session_id = %id, state = %outcome.state(), "session finished");

        self.notify(Notice::Finished { outcome, progress }).await;

        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            _ = sleep(self.shared.settings.grace_period) => {}
            _ = shutdown_signal(&mut shutdown) => {}
        }

        if let Some(channel) = self.workspace {
            match self.shared.workspaces.release(channel).await {
                Ok(()) => tracing::debug!(session_id = %id, channel = %channel, "workspace released"),
                Err(err) => tracing::warn!(session_id = %id, channel = %channel, error = %err, "workspace release failed"),
            }
        }
        self.shared.store.evict(&id);
        tracing::debug!(session_id = %id, "session evicted");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Side effects
    // ─────────────────────────────────────────────────────────────────────────

    fn publish_progress(&self) {
        self.progress_tx.send_replace(self.session.progress());
    }

    async fn notify(&self, notice: Notice) {
        if let Err(err) = self.shared.presentation.notify(self.id(), notice).await {
            tracing::warn!(session_id = %self.id(), error = %err, "presentation notice failed");
        }
    }

    async fn flush_events(&mut self, actor: Option<&ParticipantId>) {
        let correlation = self.id().to_string();
        for event in self.session.take_events() {
            let envelope = match event.to_envelope() {
                Ok(envelope) => envelope.with_correlation_id(correlation.clone()),
                Err(err) => {
                    tracing::warn!(session_id = %correlation, error = %err, "event serialization failed");
                    continue;
                }
            };
            let envelope = match actor {
                Some(actor) => envelope.with_actor(actor.as_str()),
                None => envelope,
            };
            if let Err(err) = self.shared.publisher.publish(envelope).await {
                tracing::warn!(session_id = %correlation, error = %err, "event publish failed");
            }
        }
    }
}

/// Resolves once shutdown is requested; never if the coordinator is gone.
async fn shutdown_signal(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
