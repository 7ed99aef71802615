//! Console - drives lotteries from line-oriented input.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use super::command::{ConsoleCommand, ParseError, HELP};
use super::render::Renderer;
use crate::adapters::memory::{ReactionBoard, StaticDirectory};
use crate::application::coordinator::{ActionKind, SessionCoordinator};
use crate::application::handlers::{
    ShowMyRoleHandler, ShowMyRoleQuery, StartLotteryCommand, StartLotteryHandler,
    SubmitActionCommand, SubmitActionHandler,
};
use crate::domain::foundation::{ChannelId, ParticipantId, SessionId};
use crate::domain::lottery::SessionMode;
use crate::ports::{Notice, WorkspaceProvisioner};

const FIRST_VOICE_CHANNEL: u64 = 500;

/// Whether the console should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Console {
    coordinator: SessionCoordinator,
    start: StartLotteryHandler,
    submit: SubmitActionHandler,
    show: ShowMyRoleHandler,
    directory: Arc<StaticDirectory>,
    board: Arc<ReactionBoard>,
    /// Text channel every command is issued in.
    channel: ChannelId,
    voice_channels: HashMap<String, ChannelId>,
    /// Session addressed when a line names none.
    current: Option<SessionId>,
}

impl Console {
    pub fn new(
        coordinator: SessionCoordinator,
        directory: Arc<StaticDirectory>,
        board: Arc<ReactionBoard>,
        workspaces: Arc<dyn WorkspaceProvisioner>,
        channel: ChannelId,
    ) -> Self {
        let start = StartLotteryHandler::new(
            coordinator.clone(),
            directory.clone(),
            board.clone(),
            workspaces,
        );
        let submit = SubmitActionHandler::new(coordinator.clone(), directory.clone());
        let show = ShowMyRoleHandler::new(coordinator.clone());
        Self {
            coordinator,
            start,
            submit,
            show,
            directory,
            board,
            channel,
            voice_channels: HashMap::new(),
            current: None,
        }
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.current
    }

    /// Reads lines until `quit` or end of input, printing replies and
    /// session notices as they arrive. Live sessions are cancelled on exit.
    pub async fn run<R>(
        mut self,
        input: R,
        mut notices: mpsc::UnboundedReceiver<(SessionId, Notice)>,
    ) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        println!("{}", HELP);
        let mut lines = input.lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    let (flow, output) = self.execute(&line).await;
                    for text in output {
                        println!("{}", text);
                    }
                    if flow == Flow::Quit {
                        break;
                    }
                }
                Some((session_id, notice)) = notices.recv() => self.print_notice(session_id, &notice),
            }
        }

        self.coordinator.shutdown().await;
        while let Ok((session_id, notice)) = notices.try_recv() {
            self.print_notice(session_id, &notice);
        }
        Ok(())
    }

    fn print_notice(&self, session_id: SessionId, notice: &Notice) {
        // Rejections are already the reply to the line that caused them.
        if matches!(notice, Notice::Rejected { .. }) {
            return;
        }
        println!("{}", Renderer::new(self.coordinator.catalog()).notice(session_id, notice));
    }

    /// Runs one line and returns what to print in reply.
    pub async fn execute(&mut self, line: &str) -> (Flow, Vec<String>) {
        let command = match ConsoleCommand::parse(line) {
            Ok(command) => command,
            Err(ParseError::Empty) => return (Flow::Continue, Vec::new()),
            Err(err) => return (Flow::Continue, vec![format!("error: {}", err)]),
        };
        tracing::debug!(?command, "console command");

        let output = match command {
            ConsoleCommand::Help => vec![HELP.to_string()],
            ConsoleCommand::Quit => return (Flow::Quit, vec!["bye".to_string()]),
            ConsoleCommand::Voice { name, members } => {
                let next = FIRST_VOICE_CHANNEL + self.voice_channels.len() as u64;
                let channel = *self
                    .voice_channels
                    .entry(name.clone())
                    .or_insert_with(|| ChannelId::new(next));
                let listed: Vec<&str> = members.iter().map(|m| m.as_str()).collect();
                let text = format!("voice {}: {}", name, listed.join(", "));
                self.directory.seat_voice(name, channel, members);
                vec![text]
            }
            ConsoleCommand::Bot(participant) => {
                let text = format!("{} is a bot", participant);
                self.directory.mark_bot(participant);
                vec![text]
            }
            ConsoleCommand::Start {
                actor,
                mode,
                excluded,
            } => self.start(actor, mode, excluded).await,
            ConsoleCommand::Act {
                actor,
                session,
                action,
            } => self.act(actor, session, action).await,
            ConsoleCommand::State { session } => match session.or(self.current) {
                None => vec!["no session yet".to_string()],
                Some(session_id) => match self.coordinator.session_state(session_id) {
                    Ok(progress) => vec![Renderer::new(self.coordinator.catalog()).progress(&progress)],
                    Err(err) => vec![format!("error: {}", err)],
                },
            },
            ConsoleCommand::MyRole { actor } => {
                match self.show.handle(ShowMyRoleQuery { participant: actor }) {
                    Ok(mine) => vec![Renderer::new(self.coordinator.catalog()).my_role(&mine)],
                    Err(err) => vec![format!("error: {}", err)],
                }
            }
        };
        (Flow::Continue, output)
    }

    async fn start(
        &mut self,
        actor: ParticipantId,
        mode: SessionMode,
        excluded: Option<String>,
    ) -> Vec<String> {
        let command = StartLotteryCommand {
            initiator: actor,
            channel: self.channel,
            mode,
            excluded_roles: excluded,
            seed: None,
        };
        match self.start.handle(command).await {
            Ok(started) => {
                let session_id = started.handle.session_id();
                self.current = Some(session_id);
                let mut output = Vec::new();
                if let Some(workspace) = started.workspace {
                    output.push(format!("private workspace {} created for the voice channel members", workspace));
                }
                output.push(Renderer::new(self.coordinator.catalog()).announcement(session_id, &started.announcement));
                output
            }
            Err(err) => vec![format!("error: {}", err)],
        }
    }

    async fn act(
        &mut self,
        actor: ParticipantId,
        session: Option<SessionId>,
        action: ActionKind,
    ) -> Vec<String> {
        let Some(session_id) = session.or(self.current) else {
            return vec!["no session yet; start one with /role".to_string()];
        };

        // The surface records the reaction before reporting it.
        match &action {
            ActionKind::ToggleAdd(role) => {
                self.board.set_toggle(session_id, &actor, role, true);
            }
            ActionKind::ToggleRemove(role) => {
                self.board.set_toggle(session_id, &actor, role, false);
            }
            _ => {}
        }

        let command = SubmitActionCommand {
            session_id,
            actor: actor.clone(),
            action,
        };
        match self.submit.handle(command).await {
            Ok(ack) => Renderer::new(self.coordinator.catalog())
                .ack(&ack)
                .map(|text| vec![format!("{}: {}", actor, text)])
                .unwrap_or_default(),
            Err(err) => vec![format!("{}: {}", actor, err)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::memory::InMemoryWorkspaces;
    use crate::application::coordinator::{CoordinatorPorts, CoordinatorSettings};
    use crate::domain::assignment::MatchingAssigner;
    use crate::domain::catalog::RoleCatalog;
    use crate::domain::lottery::SessionState;
    use crate::ports::TokioClock;
    use std::time::Duration;

    fn console() -> Console {
        let board = Arc::new(ReactionBoard::new());
        let workspaces = Arc::new(InMemoryWorkspaces::new());
        let coordinator = SessionCoordinator::new(
            CoordinatorSettings::default().with_draw_delay(Duration::ZERO),
            Arc::new(RoleCatalog::standard().clone()),
            Arc::new(MatchingAssigner::new()),
            CoordinatorPorts {
                presentation: board.clone(),
                workspaces: workspaces.clone(),
                publisher: Arc::new(InMemoryEventBus::new()),
                clock: Arc::new(TokioClock),
            },
        );
        Console::new(
            coordinator,
            Arc::new(StaticDirectory::new()),
            board,
            workspaces,
            ChannelId::new(1),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn exclusion_lottery_from_lines() {
        let mut console = console();
        console.execute("voice ranked alice bob").await;
        let (_, output) = console.execute("alice /exclude_role").await;
        assert!(output[0].contains("Exclude-then-draw lottery"));
        let session_id = console.current_session().unwrap();

        let (_, output) = console.execute("alice toggle top").await;
        assert!(output[0].starts_with("alice: excluding"));
        console.execute("bob toggle mid").await;
        console.execute("bob untoggle mid").await;
        console.execute("alice execute").await;

        let outcome = console.coordinator.await_terminal(session_id).await.unwrap();
        let assignment = outcome.assignment().unwrap();
        let alice = ParticipantId::new("alice").unwrap();
        assert_ne!(assignment.role_of(&alice).unwrap().as_str(), "top");

        let (_, output) = console.execute("alice myrole").await;
        assert!(!output[0].starts_with("error"));
        let (_, output) = console.execute("state").await;
        assert!(output[0].contains(&SessionState::Complete.to_string()));
    }

    #[tokio::test]
    async fn actions_need_a_session() {
        let mut console = console();
        let (flow, output) = console.execute("bob pick 1").await;
        assert_eq!(flow, Flow::Continue);
        assert_eq!(output, vec!["no session yet; start one with /role"]);
    }

    #[tokio::test]
    async fn parse_errors_are_printed() {
        let mut console = console();
        let (_, output) = console.execute("alice /role tank").await;
        assert!(output[0].starts_with("error:"));
        let (_, output) = console.execute("bob dance").await;
        assert!(output[0].contains("unknown command"));
        let (flow, _) = console.execute("quit").await;
        assert_eq!(flow, Flow::Quit);
    }
}
