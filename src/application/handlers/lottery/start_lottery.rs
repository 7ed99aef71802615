//! StartLotteryHandler - Command handler for opening a lottery session.

use std::sync::Arc;
use thiserror::Error;

use crate::application::coordinator::{SessionCoordinator, SessionHandle, SessionSpec};
use crate::domain::foundation::{
    ChannelId, DomainError, ErrorCode, ParticipantId, RoleId, SessionId, ValidationError,
};
use crate::domain::lottery::{LotteryError, PickToken, SessionMode};
use crate::ports::{
    ParticipantDirectory, PresentationAdapter, SessionAnnouncement, VoiceScope,
    WorkspaceProvisioner, WorkspaceRequest,
};

/// Command to start a lottery.
#[derive(Debug, Clone)]
pub struct StartLotteryCommand {
    pub initiator: ParticipantId,
    /// Channel the command was issued in.
    pub channel: ChannelId,
    pub mode: SessionMode,
    /// Space-separated role keys to leave out, e.g. `"top mid"`.
    pub excluded_roles: Option<String>,
    pub seed: Option<u64>,
}

/// Result of a successful start.
#[derive(Debug, Clone)]
pub struct StartLotteryResult {
    pub handle: SessionHandle,
    pub announcement: SessionAnnouncement,
    /// Voice scope the roster came from, for roster modes.
    pub scope: Option<VoiceScope>,
    /// Private workspace hosting the session, for instant pick.
    pub workspace: Option<ChannelId>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StartLotteryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("join a voice channel before starting this lottery")]
    NoVoiceScope,

    #[error(transparent)]
    Lottery(#[from] LotteryError),

    #[error("collaborator failed: {0}")]
    Collaborator(#[from] DomainError),
}

impl StartLotteryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StartLotteryError::Validation(err) => err.code(),
            StartLotteryError::NoVoiceScope => ErrorCode::NoVoiceScope,
            StartLotteryError::Lottery(err) => err.code(),
            StartLotteryError::Collaborator(err) => err.code,
        }
    }
}

/// Handler for starting lotteries.
pub struct StartLotteryHandler {
    coordinator: SessionCoordinator,
    directory: Arc<dyn ParticipantDirectory>,
    presentation: Arc<dyn PresentationAdapter>,
    workspaces: Arc<dyn WorkspaceProvisioner>,
}

impl StartLotteryHandler {
    pub fn new(
        coordinator: SessionCoordinator,
        directory: Arc<dyn ParticipantDirectory>,
        presentation: Arc<dyn PresentationAdapter>,
        workspaces: Arc<dyn WorkspaceProvisioner>,
    ) -> Self {
        Self {
            coordinator,
            directory,
            presentation,
            workspaces,
        }
    }

    pub async fn handle(&self, cmd: StartLotteryCommand) -> Result<StartLotteryResult, StartLotteryError> {
        // 1. Work out which roles are in play
        let available = self.available_roles(&cmd)?;

        // 2. Resolve and size-check the roster before touching anything external
        let scope = if cmd.mode.uses_roster() {
            let scope = self
                .directory
                .voice_scope(&cmd.initiator)
                .await?
                .ok_or(StartLotteryError::NoVoiceScope)?;
            self.check_roster(cmd.mode, &scope, available.len())?;
            Some(scope)
        } else {
            None
        };
        let roster = scope.as_ref().map(|s| s.members.clone()).unwrap_or_default();

        // 3. Instant pick runs in a private workspace for the roster
        let workspace = match (&scope, cmd.mode) {
            (Some(scope), SessionMode::InstantPick) => {
                let request = WorkspaceRequest {
                    name: format!("role-draw-{}", scope.name.to_lowercase()),
                    topic: format!("{} members only role draw", scope.name),
                    members: roster.clone(),
                };
                Some(self.workspaces.create(request).await?)
            }
            _ => None,
        };
        let host = workspace.unwrap_or(cmd.channel);

        // 4. Post the shared message and open the session on it
        let announcement = SessionAnnouncement {
            mode: cmd.mode,
            tokens: tokens_for(cmd.mode, available.len())?,
            available_roles: available.clone(),
            roster: roster.clone(),
            input_timeout: self.coordinator.input_timeout(),
        };

        let opened = self.open(host, &announcement, cmd.seed, workspace).await;
        let handle = match opened {
            Ok(handle) => handle,
            Err(err) => {
                if let Some(channel) = workspace {
                    self.release_quietly(channel).await;
                }
                return Err(err);
            }
        };

        tracing::info!(
            session_id = %handle.session_id(),
            mode = %cmd.mode,
            initiator = %cmd.initiator,
            roles = available.len(),
            roster = roster.len(),
            "lottery started"
        );

        Ok(StartLotteryResult {
            handle,
            announcement,
            scope,
            workspace,
        })
    }

    fn available_roles(&self, cmd: &StartLotteryCommand) -> Result<Vec<RoleId>, StartLotteryError> {
        let catalog = self.coordinator.catalog();
        if cmd.mode == SessionMode::ExclusionThenLottery {
            // Participants exclude for themselves; everyone draws from the full catalog.
            return Ok(catalog.role_ids());
        }
        let excluded = catalog.parse_exclusions(cmd.excluded_roles.as_deref().unwrap_or(""))?;
        Ok(catalog.available_after(&excluded)?)
    }

    fn check_roster(&self, mode: SessionMode, scope: &VoiceScope, roles: usize) -> Result<(), StartLotteryError> {
        let actual = scope.members.len();
        let (min, max) = match mode {
            SessionMode::InstantPick => (roles, usize::MAX),
            SessionMode::ExclusionThenLottery => {
                (self.coordinator.settings().exclusion_min_participants, roles)
            }
            SessionMode::OpenLottery => return Ok(()),
        };
        if actual < min || actual > max {
            return Err(ValidationError::out_of_range("participants", min, max, actual).into());
        }
        Ok(())
    }

    async fn open(
        &self,
        host: ChannelId,
        announcement: &SessionAnnouncement,
        seed: Option<u64>,
        workspace: Option<ChannelId>,
    ) -> Result<SessionHandle, StartLotteryError> {
        let message = self.presentation.post_session(host, announcement).await?;
        let mut spec = SessionSpec::new(
            SessionId::new(host, message),
            announcement.mode,
            announcement.available_roles.clone(),
        )
        .with_roster(announcement.roster.clone());
        if let Some(channel) = workspace {
            spec = spec.with_workspace(channel);
        }
        if let Some(seed) = seed {
            spec = spec.with_seed(seed);
        }
        Ok(self.coordinator.create_session(spec)?)
    }

    async fn release_quietly(&self, channel: ChannelId) {
        if let Err(err) = self.workspaces.release(channel).await {
            tracing::warn!(channel = %channel, error = %err, "could not release workspace after failed start");
        }
    }
}

/// Pick affordances shown on the message; exclusion sessions have none.
fn tokens_for(mode: SessionMode, roles: usize) -> Result<Vec<PickToken>, ValidationError> {
    if !mode.accepts_picks() {
        return Ok(Vec::new());
    }
    (1..=roles)
        .map(|ordinal| {
            u8::try_from(ordinal)
                .map_err(|_| ValidationError::out_of_range("tokens", 1, usize::from(u8::MAX), ordinal))
                .and_then(PickToken::new)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{InMemoryWorkspaces, ReactionBoard, StaticDirectory};
    use crate::application::coordinator::{CoordinatorPorts, CoordinatorSettings};
    use crate::domain::assignment::MatchingAssigner;
    use crate::domain::catalog::RoleCatalog;
    use crate::domain::lottery::SessionState;
    use crate::ports::TokioClock;

    struct Fixture {
        handler: StartLotteryHandler,
        directory: Arc<StaticDirectory>,
        board: Arc<ReactionBoard>,
        workspaces: Arc<InMemoryWorkspaces>,
    }

    fn fixture() -> Fixture {
        let directory = Arc::new(StaticDirectory::new());
        let board = Arc::new(ReactionBoard::new());
        let workspaces = Arc::new(InMemoryWorkspaces::new());
        let coordinator = SessionCoordinator::new(
            CoordinatorSettings::default(),
            Arc::new(RoleCatalog::standard().clone()),
            Arc::new(MatchingAssigner::new()),
            CoordinatorPorts {
                presentation: board.clone(),
                workspaces: workspaces.clone(),
                publisher: Arc::new(InMemoryEventBus::new()),
                clock: Arc::new(TokioClock),
            },
        );
        let handler = StartLotteryHandler::new(
            coordinator,
            directory.clone(),
            board.clone(),
            workspaces.clone(),
        );
        Fixture {
            handler,
            directory,
            board,
            workspaces,
        }
    }

    fn who(name: &str) -> ParticipantId {
        ParticipantId::new(name).unwrap()
    }

    fn command(mode: SessionMode, excluded: Option<&str>) -> StartLotteryCommand {
        StartLotteryCommand {
            initiator: who("alice"),
            channel: ChannelId::new(100),
            mode,
            excluded_roles: excluded.map(str::to_string),
            seed: Some(1),
        }
    }

    fn seat(f: &Fixture, names: &[&str]) {
        let members = names.iter().map(|n| who(n)).collect();
        f.directory.seat_voice("ranked", ChannelId::new(500), members);
    }

    #[tokio::test(start_paused = true)]
    async fn open_lottery_drops_pre_excluded_roles() {
        let f = fixture();
        let result = f
            .handler
            .handle(command(SessionMode::OpenLottery, Some("TOP  mid")))
            .await
            .unwrap();

        let keys: Vec<&str> = result.announcement.available_roles.iter().map(|r| r.as_str()).collect();
        assert_eq!(keys, vec!["jg", "adc", "sup"]);
        assert_eq!(result.announcement.tokens.len(), 3);
        assert_eq!(result.handle.progress().state, SessionState::Collecting);
        assert_eq!(result.handle.session_id().channel(), ChannelId::new(100));
        assert!(f.board.announcement(result.handle.session_id()).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_role_lists_valid_keys() {
        let f = fixture();
        let err = f
            .handler
            .handle(command(SessionMode::OpenLottery, Some("top tank")))
            .await
            .unwrap_err();
        match err {
            StartLotteryError::Validation(ValidationError::UnknownRole { role, valid }) => {
                assert_eq!(role, "tank");
                assert_eq!(valid, vec!["top", "jg", "mid", "adc", "sup"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn excluding_everything_is_rejected() {
        let f = fixture();
        let err = f
            .handler
            .handle(command(SessionMode::OpenLottery, Some("top jg mid adc sup")))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmptyField);
    }

    #[tokio::test(start_paused = true)]
    async fn roster_modes_need_a_voice_scope() {
        let f = fixture();
        let err = f
            .handler
            .handle(command(SessionMode::ExclusionThenLottery, None))
            .await
            .unwrap_err();
        assert_eq!(err, StartLotteryError::NoVoiceScope);
    }

    #[tokio::test(start_paused = true)]
    async fn exclusion_roster_size_is_bounded() {
        let f = fixture();
        seat(&f, &["alice"]);
        let err = f
            .handler
            .handle(command(SessionMode::ExclusionThenLottery, None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OutOfRange);

        seat(&f, &["alice", "b", "c", "d", "e", "f"]);
        let err = f
            .handler
            .handle(command(SessionMode::ExclusionThenLottery, None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OutOfRange);
    }

    #[tokio::test(start_paused = true)]
    async fn exclusion_mode_uses_full_catalog_and_no_tokens() {
        let f = fixture();
        seat(&f, &["alice", "bob", "carol"]);
        let result = f
            .handler
            .handle(command(SessionMode::ExclusionThenLottery, Some("top")))
            .await
            .unwrap();
        assert_eq!(result.announcement.available_roles.len(), 5);
        assert!(result.announcement.tokens.is_empty());
        assert_eq!(result.announcement.roster.len(), 3);
        assert!(result.workspace.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn instant_pick_runs_in_a_private_workspace() {
        let f = fixture();
        seat(&f, &["alice", "bob"]);
        let result = f
            .handler
            .handle(command(SessionMode::InstantPick, Some("top jg mid")))
            .await
            .unwrap();

        let workspace = result.workspace.unwrap();
        assert_eq!(result.handle.session_id().channel(), workspace);
        assert!(f.workspaces.is_open(workspace));
        assert_eq!(f.workspaces.members(workspace), vec![who("alice"), who("bob")]);
        assert_eq!(result.announcement.tokens.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn instant_pick_needs_enough_members() {
        let f = fixture();
        seat(&f, &["alice"]);
        let err = f
            .handler
            .handle(command(SessionMode::InstantPick, Some("top jg mid")))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OutOfRange);
        assert_eq!(f.workspaces.open_count(), 0);
    }

    #[test]
    fn exclusion_sessions_show_no_tokens() {
        assert!(tokens_for(SessionMode::ExclusionThenLottery, 5).unwrap().is_empty());
        let tokens = tokens_for(SessionMode::OpenLottery, 3).unwrap();
        let ordinals: Vec<u8> = tokens.iter().map(PickToken::get).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
    }
}
