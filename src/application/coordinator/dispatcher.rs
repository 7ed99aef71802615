//! Per-session action channel and routing of actions onto it.
//!
//! Every participant action for a session travels through one FIFO
//! channel, so the session task applies them in exactly the order they
//! were submitted, whatever their kind.

use tokio::sync::{mpsc, oneshot};

use super::action::{Ack, ActionEvent, ActionKind};
use crate::domain::foundation::{ParticipantId, RoleId};
use crate::domain::lottery::{LotteryError, PickToken};

pub(crate) type PickEvent = ActionEvent<PickToken>;
pub(crate) type ToggleEvent = ActionEvent<RoleId>;
pub(crate) type SignalEvent = ActionEvent<()>;

/// One queued action, typed by kind.
#[derive(Debug)]
pub(crate) enum SessionAction {
    Pick(PickEvent),
    ToggleAdd(ToggleEvent),
    ToggleRemove(ToggleEvent),
    Execute(SignalEvent),
    Cancel(SignalEvent),
}

impl SessionAction {
    fn wrap(actor: ParticipantId, action: ActionKind) -> (Self, oneshot::Receiver<Result<Ack, LotteryError>>) {
        match action {
            ActionKind::Pick(token) => {
                let (event, rx) = ActionEvent::new(actor, token);
                (SessionAction::Pick(event), rx)
            }
            ActionKind::ToggleAdd(role) => {
                let (event, rx) = ActionEvent::new(actor, role);
                (SessionAction::ToggleAdd(event), rx)
            }
            ActionKind::ToggleRemove(role) => {
                let (event, rx) = ActionEvent::new(actor, role);
                (SessionAction::ToggleRemove(event), rx)
            }
            ActionKind::Execute => {
                let (event, rx) = ActionEvent::new(actor, ());
                (SessionAction::Execute(event), rx)
            }
            ActionKind::Cancel => {
                let (event, rx) = ActionEvent::new(actor, ());
                (SessionAction::Cancel(event), rx)
            }
        }
    }

    pub fn actor(&self) -> &ParticipantId {
        match self {
            SessionAction::Pick(event) => &event.actor,
            SessionAction::ToggleAdd(event) | SessionAction::ToggleRemove(event) => &event.actor,
            SessionAction::Execute(event) | SessionAction::Cancel(event) => &event.actor,
        }
    }
}

/// Sending half of a session's channel.
#[derive(Debug, Clone)]
pub(crate) struct SessionInbox {
    actions: mpsc::Sender<SessionAction>,
}

/// Receiving half, owned by the session task.
#[derive(Debug)]
pub(crate) struct InboxReceivers {
    pub actions: mpsc::Receiver<SessionAction>,
}

/// Creates the channel for one session.
pub(crate) fn session_channels(buffer: usize) -> (SessionInbox, InboxReceivers) {
    let (actions, actions_rx) = mpsc::channel(buffer.max(1));
    (SessionInbox { actions }, InboxReceivers { actions: actions_rx })
}

/// The session task stopped receiving; the caller maps this to the
/// session's final state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InboxClosed;

impl SessionInbox {
    /// Queues `action` behind everything already submitted and returns
    /// where the answer will arrive.
    pub async fn route(
        &self,
        actor: ParticipantId,
        action: ActionKind,
    ) -> Result<oneshot::Receiver<Result<Ack, LotteryError>>, InboxClosed> {
        let (action, rx) = SessionAction::wrap(actor, action);
        self.actions.send(action).await.map_err(|_| InboxClosed)?;
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> ParticipantId {
        ParticipantId::new("alice").unwrap()
    }

    #[tokio::test]
    async fn wraps_each_kind() {
        let (inbox, mut rx) = session_channels(4);

        inbox
            .route(actor(), ActionKind::ToggleAdd(RoleId::new("top").unwrap()))
            .await
            .unwrap();
        inbox.route(actor(), ActionKind::Execute).await.unwrap();

        match rx.actions.try_recv().unwrap() {
            SessionAction::ToggleAdd(event) => assert_eq!(event.payload.as_str(), "top"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(rx.actions.try_recv().unwrap(), SessionAction::Execute(_)));
        assert!(rx.actions.try_recv().is_err());
    }

    #[tokio::test]
    async fn keeps_submission_order_across_kinds() {
        let (inbox, mut rx) = session_channels(8);
        let top = RoleId::new("top").unwrap();
        inbox.route(actor(), ActionKind::Pick(PickToken::new(2).unwrap())).await.unwrap();
        inbox.route(actor(), ActionKind::ToggleRemove(top.clone())).await.unwrap();
        inbox.route(actor(), ActionKind::ToggleAdd(top)).await.unwrap();
        inbox.route(actor(), ActionKind::Cancel).await.unwrap();
        inbox.route(actor(), ActionKind::Execute).await.unwrap();

        let order: Vec<&'static str> = (0..5)
            .map(|_| match rx.actions.try_recv().unwrap() {
                SessionAction::Pick(_) => "pick",
                SessionAction::ToggleAdd(_) => "toggle_add",
                SessionAction::ToggleRemove(_) => "toggle_remove",
                SessionAction::Execute(_) => "execute",
                SessionAction::Cancel(_) => "cancel",
            })
            .collect();
        assert_eq!(order, vec!["pick", "toggle_remove", "toggle_add", "cancel", "execute"]);
    }

    #[tokio::test]
    async fn closed_inbox_is_reported() {
        let (inbox, rx) = session_channels(1);
        drop(rx);
        let result = inbox.route(actor(), ActionKind::Cancel).await;
        assert_eq!(result.err(), Some(InboxClosed));
    }

    #[tokio::test]
    async fn reply_reaches_submitter() {
        let (inbox, mut rx) = session_channels(1);
        let answer = inbox.route(actor(), ActionKind::Cancel).await.unwrap();
        let SessionAction::Cancel(event) = rx.actions.try_recv().unwrap() else {
            panic!("expected cancel");
        };
        assert_eq!(event.actor, actor());
        event.respond(Ok(Ack::Cancelled));
        assert_eq!(answer.await.unwrap(), Ok(Ack::Cancelled));
    }
}
