//! SelectionSession aggregate - one run of the role lottery.
//!
//! The aggregate only validates and records. Deadlines, the draw delay and
//! calling the assignment strategy are the coordinator's job; it drives the
//! session through `lock → begin_assignment → complete | fail`.

use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use super::events::{
    AssignmentFailed, ExclusionsUpdated, LotteryEvent, PickRecorded, RolesAssigned,
    SessionCancelled, SessionLocked, SessionOpened, SessionTimedOut,
};
use super::{
    Claim, LotteryError, Pick, PickToken, SessionMode, SessionProgress, SessionState,
    SlotProgress, TerminalOutcome, MAX_TOKENS,
};
use crate::domain::assignment::{Assignment, Candidate, Infeasible, RoleGrant};
use crate::domain::foundation::{
    EventId, ParticipantId, RoleId, SessionId, StateMachine, Timestamp, ValidationError,
};

/// Everything needed to open a session.
#[derive(Debug, Clone)]
pub struct SessionDraft {
    pub id: SessionId,
    pub mode: SessionMode,
    pub available_roles: Vec<RoleId>,
    /// Eligible participants; ignored for open lotteries.
    pub roster: Vec<ParticipantId>,
    /// Smallest roster an exclusion session accepts.
    pub min_participants: usize,
}

/// Result of an accepted pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// Open lottery pick recorded.
    Joined {
        token: PickToken,
        joined: usize,
        capacity: usize,
    },
    /// Instant pick claim; the role is revealed immediately.
    Claimed {
        token: PickToken,
        role: RoleId,
        claimed: usize,
        total: usize,
    },
    /// The participant already picked; their first pick stands.
    AlreadyPicked,
}

/// What the coordinator must run once the session is assigning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawInput {
    /// Unconstrained shuffle of these participants over the available roles.
    Shuffle(Vec<ParticipantId>),
    /// Exclusion-constrained assignment.
    Constrained(Vec<Candidate>),
    /// Roles were already bound by claims.
    Claimed(Vec<RoleGrant>),
}

#[derive(Debug, Clone)]
enum Entries {
    Open {
        picks: Vec<Pick>,
    },
    Instant {
        /// Hidden role behind each token, fixed at creation.
        bindings: Vec<RoleId>,
        claims: Vec<Option<ParticipantId>>,
    },
    Exclusion {
        exclusions: BTreeMap<ParticipantId, BTreeSet<RoleId>>,
    },
}

/// A selection session.
///
/// # Invariants
///
/// - input is accepted only while `Collecting`
/// - the outcome is set exactly once, on entering a terminal state
/// - a completed assignment only uses `available_roles`
#[derive(Debug, Clone)]
pub struct SelectionSession {
    id: SessionId,
    mode: SessionMode,
    state: SessionState,
    available_roles: Vec<RoleId>,
    roster: Vec<ParticipantId>,
    entries: Entries,
    outcome: Option<TerminalOutcome>,
    opened_at: Timestamp,
    domain_events: Vec<LotteryEvent>,
}

impl SelectionSession {
    /// Validates the draft and opens the session for input.
    ///
    /// # Errors
    ///
    /// - `EmptyField` / `DuplicateRole` for a bad role list
    /// - `OutOfRange` for a pick session with more roles than tokens
    /// - `DuplicateParticipant` for a roster listing someone twice
    /// - `OutOfRange` / `TooManyParticipants` / `InvalidFormat` for a roster
    ///   the mode cannot work with
    pub fn open(draft: SessionDraft, rng: &mut dyn RngCore) -> Result<Self, LotteryError> {
        let SessionDraft {
            id,
            mode,
            available_roles,
            roster,
            min_participants,
        } = draft;

        if available_roles.is_empty() {
            return Err(ValidationError::empty_field("available_roles").into());
        }
        let mut seen = HashSet::new();
        for role in &available_roles {
            if !seen.insert(role) {
                return Err(ValidationError::DuplicateRole(role.to_string()).into());
            }
        }

        // One numbered token per role.
        if mode.accepts_picks() && available_roles.len() > MAX_TOKENS as usize {
            return Err(ValidationError::out_of_range(
                "available_roles",
                1,
                MAX_TOKENS as usize,
                available_roles.len(),
            )
            .into());
        }

        let roster = if mode.uses_roster() { roster } else { Vec::new() };
        let mut seen = HashSet::new();
        for participant in &roster {
            if !seen.insert(participant) {
                return Err(ValidationError::DuplicateParticipant(participant.to_string()).into());
            }
        }

        let slots = available_roles.len();
        let entries = match mode {
            SessionMode::OpenLottery => Entries::Open { picks: Vec::new() },
            SessionMode::InstantPick => {
                if roster.len() < slots {
                    return Err(ValidationError::invalid_format(
                        "roster",
                        format!("needs at least {} members, found {}", slots, roster.len()),
                    )
                    .into());
                }
                let mut bindings = available_roles.clone();
                bindings.shuffle(rng);
                Entries::Instant {
                    bindings,
                    claims: vec![None; slots],
                }
            }
            SessionMode::ExclusionThenLottery => {
                if roster.len() > slots {
                    return Err(ValidationError::TooManyParticipants {
                        participants: roster.len(),
                        roles: slots,
                    }
                    .into());
                }
                if roster.len() < min_participants {
                    return Err(ValidationError::out_of_range(
                        "roster",
                        min_participants,
                        slots,
                        roster.len(),
                    )
                    .into());
                }
                Entries::Exclusion {
                    exclusions: BTreeMap::new(),
                }
            }
        };

        let opened_at = Timestamp::now();
        let mut session = Self {
            id,
            mode,
            state: SessionState::Collecting,
            available_roles,
            roster,
            entries,
            outcome: None,
            opened_at,
            domain_events: Vec::new(),
        };
        session.record(LotteryEvent::Opened(SessionOpened {
            event_id: EventId::new(),
            session_id: id,
            mode,
            available_roles: session.available_roles.clone(),
            roster: session.roster.clone(),
            opened_at,
        }));
        Ok(session)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn available_roles(&self) -> &[RoleId] {
        &self.available_roles
    }

    pub fn roster(&self) -> &[ParticipantId] {
        &self.roster
    }

    pub fn opened_at(&self) -> Timestamp {
        self.opened_at
    }

    pub fn outcome(&self) -> Option<&TerminalOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_roster_member(&self, participant: &ParticipantId) -> bool {
        self.roster.contains(participant)
    }

    /// Whether every instant-pick token has been claimed.
    pub fn all_claimed(&self) -> bool {
        match &self.entries {
            Entries::Instant { claims, .. } => claims.iter().all(Option::is_some),
            _ => false,
        }
    }

    /// Current exclusion set of a roster member.
    pub fn exclusions_of(&self, participant: &ParticipantId) -> BTreeSet<RoleId> {
        match &self.entries {
            Entries::Exclusion { exclusions } => {
                exclusions.get(participant).cloned().unwrap_or_default()
            }
            _ => BTreeSet::new(),
        }
    }

    /// Takes accumulated domain events, clearing the internal buffer.
    pub fn take_events(&mut self) -> Vec<LotteryEvent> {
        std::mem::take(&mut self.domain_events)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    /// Records a pick (open lottery) or claim (instant pick).
    ///
    /// A participant's first pick wins; later picks return `AlreadyPicked`.
    pub fn record_pick(
        &mut self,
        actor: &ParticipantId,
        token: PickToken,
    ) -> Result<PickOutcome, LotteryError> {
        self.ensure_collecting()?;
        if !self.mode.accepts_picks() {
            return Err(LotteryError::unsupported("pick", self.mode));
        }
        if self.mode.uses_roster() && !self.is_roster_member(actor) {
            return Err(LotteryError::NotParticipant(actor.clone()));
        }
        let capacity = self.available_roles.len();
        if token.index() >= capacity {
            return Err(ValidationError::out_of_range("pick_token", 1, capacity, token.get() as usize).into());
        }

        let (outcome, role) = match &mut self.entries {
            Entries::Open { picks } => {
                if picks.iter().any(|p| &p.participant == actor) {
                    return Ok(PickOutcome::AlreadyPicked);
                }
                if picks.len() >= capacity {
                    return Err(LotteryError::SessionFull { capacity });
                }
                picks.push(Pick {
                    participant: actor.clone(),
                    token,
                });
                let outcome = PickOutcome::Joined {
                    token,
                    joined: picks.len(),
                    capacity,
                };
                (outcome, None)
            }
            Entries::Instant { bindings, claims } => {
                if claims.iter().flatten().any(|holder| holder == actor) {
                    return Ok(PickOutcome::AlreadyPicked);
                }
                if let Some(holder) = &claims[token.index()] {
                    return Err(LotteryError::AffordanceClaimed {
                        token,
                        claimed_by: holder.clone(),
                    });
                }
                claims[token.index()] = Some(actor.clone());
                let role = bindings[token.index()].clone();
                let outcome = PickOutcome::Claimed {
                    token,
                    role: role.clone(),
                    claimed: claims.iter().flatten().count(),
                    total: capacity,
                };
                (outcome, Some(role))
            }
            Entries::Exclusion { .. } => {
                return Err(LotteryError::unsupported("pick", self.mode));
            }
        };

        self.record(LotteryEvent::PickRecorded(PickRecorded {
            event_id: EventId::new(),
            session_id: self.id,
            participant: actor.clone(),
            token,
            role,
            recorded_at: Timestamp::now(),
        }));
        Ok(outcome)
    }

    /// Replaces a roster member's exclusion set with `excluded`.
    ///
    /// The set is the member's full current toggle state, so applying the
    /// same state twice is a no-op. Returns whether the set changed.
    pub fn apply_exclusions(
        &mut self,
        actor: &ParticipantId,
        excluded: BTreeSet<RoleId>,
    ) -> Result<bool, LotteryError> {
        self.ensure_collecting()?;
        if !self.mode.accepts_toggles() {
            return Err(LotteryError::unsupported("toggle", self.mode));
        }
        if let Some(unknown) = excluded.iter().find(|r| !self.available_roles.contains(r)) {
            return Err(ValidationError::unknown_role(
                unknown.as_str(),
                self.available_roles.iter().map(RoleId::as_str),
            )
            .into());
        }
        if !self.is_roster_member(actor) {
            return Err(LotteryError::NotParticipant(actor.clone()));
        }
        let mode = self.mode;
        let Entries::Exclusion { exclusions } = &mut self.entries else {
            return Err(LotteryError::unsupported("toggle", mode));
        };

        let current = exclusions.get(actor).cloned().unwrap_or_default();
        if current == excluded {
            return Ok(false);
        }
        if excluded.is_empty() {
            exclusions.remove(actor);
        } else {
            exclusions.insert(actor.clone(), excluded.clone());
        }

        self.record(LotteryEvent::ExclusionsUpdated(ExclusionsUpdated {
            event_id: EventId::new(),
            session_id: self.id,
            participant: actor.clone(),
            excluded,
            updated_at: Timestamp::now(),
        }));
        Ok(true)
    }

    /// Handles an explicit execute / start-draw signal.
    ///
    /// Exclusion sessions only accept it from roster members; instant
    /// sessions lock by themselves once every token is claimed.
    pub fn execute(&mut self, actor: &ParticipantId) -> Result<(), LotteryError> {
        self.ensure_collecting()?;
        if !self.mode.accepts_execute() {
            return Err(LotteryError::unsupported("execute", self.mode));
        }
        if self.mode.uses_roster() && !self.is_roster_member(actor) {
            return Err(LotteryError::NotParticipant(actor.clone()));
        }
        self.lock()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Closes input. `Collecting → Locking`.
    pub fn lock(&mut self) -> Result<(), LotteryError> {
        self.transition(SessionState::Locking)?;
        let participants = match &self.entries {
            Entries::Open { picks } => picks.len(),
            Entries::Instant { claims, .. } => claims.iter().flatten().count(),
            Entries::Exclusion { .. } => self.roster.len(),
        };
        self.record(LotteryEvent::Locked(SessionLocked {
            event_id: EventId::new(),
            session_id: self.id,
            participants,
            locked_at: Timestamp::now(),
        }));
        Ok(())
    }

    /// `Locking → Assigning`; returns what the draw has to work with.
    pub fn begin_assignment(&mut self) -> Result<DrawInput, LotteryError> {
        self.transition(SessionState::Assigning)?;
        let input = match &self.entries {
            Entries::Open { picks } => {
                DrawInput::Shuffle(picks.iter().map(|p| p.participant.clone()).collect())
            }
            Entries::Instant { bindings, claims } => DrawInput::Claimed(
                claims
                    .iter()
                    .zip(bindings)
                    .filter_map(|(holder, role)| {
                        holder.as_ref().map(|participant| RoleGrant {
                            participant: participant.clone(),
                            role: role.clone(),
                        })
                    })
                    .collect(),
            ),
            Entries::Exclusion { exclusions } => DrawInput::Constrained(
                self.roster
                    .iter()
                    .map(|participant| {
                        let excluded = exclusions.get(participant).cloned().unwrap_or_default();
                        Candidate::from_exclusions(
                            participant.clone(),
                            &excluded,
                            &self.available_roles,
                        )
                    })
                    .collect(),
            ),
        };
        Ok(input)
    }

    /// `Assigning → Complete`, storing the result.
    ///
    /// # Errors
    ///
    /// - `UnknownRole` if a grant uses a role outside `available_roles`
    /// - `NotParticipant` if a grant names someone who did not take part
    pub fn complete(&mut self, assignment: Assignment) -> Result<Arc<Assignment>, LotteryError> {
        for grant in assignment.grants() {
            if !self.available_roles.contains(&grant.role) {
                return Err(ValidationError::unknown_role(
                    grant.role.as_str(),
                    self.available_roles.iter().map(RoleId::as_str),
                )
                .into());
            }
            if !self.took_part(&grant.participant) {
                return Err(LotteryError::NotParticipant(grant.participant.clone()));
            }
        }

        self.transition(SessionState::Complete)?;
        let assignment = Arc::new(assignment);
        self.outcome = Some(TerminalOutcome::Complete(Arc::clone(&assignment)));
        self.record(LotteryEvent::RolesAssigned(RolesAssigned {
            event_id: EventId::new(),
            session_id: self.id,
            grants: assignment.grants().to_vec(),
            attempts: assignment.attempts(),
            assigned_at: Timestamp::now(),
        }));
        Ok(assignment)
    }

    /// `Assigning → Infeasible`.
    pub fn fail(&mut self, infeasible: Infeasible) -> Result<(), LotteryError> {
        self.transition(SessionState::Infeasible)?;
        self.record(LotteryEvent::AssignmentFailed(AssignmentFailed {
            event_id: EventId::new(),
            session_id: self.id,
            reason: infeasible.reason.clone(),
            attempts: infeasible.attempts,
            failed_at: Timestamp::now(),
        }));
        self.outcome = Some(TerminalOutcome::Infeasible(infeasible));
        Ok(())
    }

    /// Input deadline passed. `Collecting → TimedOut`.
    pub fn time_out(&mut self) -> Result<(), LotteryError> {
        self.transition(SessionState::TimedOut)?;
        self.outcome = Some(TerminalOutcome::TimedOut);
        self.record(LotteryEvent::TimedOut(SessionTimedOut {
            event_id: EventId::new(),
            session_id: self.id,
            timed_out_at: Timestamp::now(),
        }));
        Ok(())
    }

    /// `Collecting → Cancelled`. `actor` is `None` for a system cancel.
    pub fn cancel(&mut self, actor: Option<&ParticipantId>) -> Result<(), LotteryError> {
        self.ensure_collecting()?;
        if let Some(actor) = actor {
            if self.mode.uses_roster() && !self.is_roster_member(actor) {
                return Err(LotteryError::NotParticipant(actor.clone()));
            }
        }
        self.transition(SessionState::Cancelled)?;
        self.outcome = Some(TerminalOutcome::Cancelled);
        self.record(LotteryEvent::Cancelled(SessionCancelled {
            event_id: EventId::new(),
            session_id: self.id,
            cancelled_by: actor.cloned(),
            cancelled_at: Timestamp::now(),
        }));
        Ok(())
    }

    /// Snapshot for progress rendering.
    pub fn progress(&self) -> SessionProgress {
        let slots = match &self.entries {
            Entries::Open { picks } => SlotProgress::OpenLottery {
                picks: picks.clone(),
                capacity: self.available_roles.len(),
            },
            Entries::Instant { bindings, claims } => {
                let mut revealed = Vec::new();
                let mut remaining_tokens = Vec::new();
                for (idx, holder) in claims.iter().enumerate() {
                    let token = PickToken::from_index(idx);
                    match holder {
                        Some(participant) => revealed.push(Claim {
                            participant: participant.clone(),
                            token,
                            role: bindings[idx].clone(),
                        }),
                        None => remaining_tokens.push(token),
                    }
                }
                SlotProgress::InstantPick {
                    claims: revealed,
                    total: claims.len(),
                    remaining_tokens,
                }
            }
            Entries::Exclusion { exclusions } => SlotProgress::ExclusionThenLottery {
                roster: self.roster.clone(),
                exclusions: exclusions.clone(),
            },
        };
        SessionProgress {
            session_id: self.id,
            mode: self.mode,
            state: self.state,
            available_roles: self.available_roles.clone(),
            slots,
            remaining: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_collecting(&self) -> Result<(), LotteryError> {
        if self.state.is_collecting() {
            Ok(())
        } else {
            Err(LotteryError::SessionClosed(self.state))
        }
    }

    fn transition(&mut self, target: SessionState) -> Result<(), LotteryError> {
        if self.state.is_terminal() {
            return Err(LotteryError::SessionClosed(self.state));
        }
        self.state = self
            .state
            .transition_to(target)
            .map_err(|e| LotteryError::InvalidTransition(e.to_string()))?;
        Ok(())
    }

    fn took_part(&self, participant: &ParticipantId) -> bool {
        match &self.entries {
            Entries::Open { picks } => picks.iter().any(|p| &p.participant == participant),
            Entries::Instant { claims, .. } => claims.iter().flatten().any(|h| h == participant),
            Entries::Exclusion { .. } => self.is_roster_member(participant),
        }
    }

    fn record(&mut self, event: LotteryEvent) {
        self.domain_events.push(event);
    }
}
