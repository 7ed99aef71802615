//! SubmitActionHandler - forwards a participant's action to its session.

use std::sync::Arc;

use crate::application::coordinator::{Ack, ActionKind, SessionCoordinator};
use crate::domain::foundation::{ParticipantId, SessionId};
use crate::domain::lottery::LotteryError;
use crate::ports::ParticipantDirectory;

/// A raw action reported by the presentation surface.
#[derive(Debug, Clone)]
pub struct SubmitActionCommand {
    pub session_id: SessionId,
    pub actor: ParticipantId,
    pub action: ActionKind,
}

/// Handler that filters automated accounts before anything reaches a session.
pub struct SubmitActionHandler {
    coordinator: SessionCoordinator,
    directory: Arc<dyn ParticipantDirectory>,
}

impl SubmitActionHandler {
    pub fn new(coordinator: SessionCoordinator, directory: Arc<dyn ParticipantDirectory>) -> Self {
        Self {
            coordinator,
            directory,
        }
    }

    pub async fn handle(&self, cmd: SubmitActionCommand) -> Result<Ack, LotteryError> {
        if self.directory.is_bot(&cmd.actor).await? {
            tracing::debug!(session_id = %cmd.session_id, actor = %cmd.actor, "ignoring bot action");
            return Err(LotteryError::NotParticipant(cmd.actor));
        }
        self.coordinator
            .submit_event(cmd.session_id, cmd.actor, cmd.action)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::{InMemoryWorkspaces, ReactionBoard, StaticDirectory};
    use crate::application::coordinator::{CoordinatorPorts, CoordinatorSettings, SessionSpec};
    use crate::domain::assignment::MatchingAssigner;
    use crate::domain::catalog::RoleCatalog;
    use crate::domain::foundation::{ChannelId, MessageId, RoleId};
    use crate::domain::lottery::{PickToken, SessionMode};
    use crate::ports::TokioClock;

    fn setup() -> (SubmitActionHandler, SessionCoordinator, Arc<StaticDirectory>) {
        let directory = Arc::new(StaticDirectory::new());
        let coordinator = SessionCoordinator::new(
            CoordinatorSettings::default(),
            Arc::new(RoleCatalog::standard().clone()),
            Arc::new(MatchingAssigner::new()),
            CoordinatorPorts {
                presentation: Arc::new(ReactionBoard::new()),
                workspaces: Arc::new(InMemoryWorkspaces::new()),
                publisher: Arc::new(InMemoryEventBus::new()),
                clock: Arc::new(TokioClock),
            },
        );
        let handler = SubmitActionHandler::new(coordinator.clone(), directory.clone());
        (handler, coordinator, directory)
    }

    fn pick(session_id: SessionId, actor: &str) -> SubmitActionCommand {
        SubmitActionCommand {
            session_id,
            actor: ParticipantId::new(actor).unwrap(),
            action: ActionKind::Pick(PickToken::new(1).unwrap()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn bots_never_reach_the_session() {
        let (handler, coordinator, directory) = setup();
        directory.mark_bot(ParticipantId::new("dicebot").unwrap());
        let session_id = SessionId::new(ChannelId::new(1), MessageId::new(1));
        coordinator
            .create_session(SessionSpec::new(
                session_id,
                SessionMode::OpenLottery,
                vec![RoleId::new("top").unwrap()],
            ))
            .unwrap();

        let err = handler.handle(pick(session_id, "dicebot")).await.unwrap_err();
        assert!(matches!(err, LotteryError::NotParticipant(_)));
        assert_eq!(coordinator.session_state(session_id).unwrap().joined(), 0);

        let ack = handler.handle(pick(session_id, "alice")).await.unwrap();
        assert!(matches!(ack, Ack::Joined { joined: 1, .. }));
    }

    #[tokio::test]
    async fn unknown_session_is_reported() {
        let (handler, _, _) = setup();
        let session_id = SessionId::new(ChannelId::new(1), MessageId::new(404));
        let err = handler.handle(pick(session_id, "alice")).await.unwrap_err();
        assert_eq!(err, LotteryError::SessionNotFound(session_id));
    }
}
