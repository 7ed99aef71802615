//! Session coordination.
//!
//! One Tokio task per session owns its `SelectionSession` and applies
//! events strictly one at a time. Participants reach a session through a
//! single FIFO channel of typed actions, routed by session id:
//!
//! ```text
//! submit_event ──► SessionStore ──► SessionInbox ──► SessionRunner
//!                                   (SessionAction)      │ select! over
//!                                                        │ actions + deadline
//!                                                        ▼
//!                                            AssignmentStrategy / ports
//! ```

mod action;
#[allow(clippy::module_inception)]
mod coordinator;
mod dispatcher;
mod runner;
mod settings;
mod store;

pub use action::{Ack, ActionKind};
pub use coordinator::{CoordinatorPorts, SessionCoordinator, SessionHandle, SessionSpec};
pub use settings::CoordinatorSettings;
pub use store::{CurrentRole, FinishedSession};
