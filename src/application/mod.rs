//! Application layer - Coordinator, Commands, Queries, and Handlers.
//!
//! This layer drives lottery sessions and coordinates between ports.
//! The coordinator owns every live session; handlers are the thin
//! command/query entry points used by adapters.

pub mod coordinator;
pub mod handlers;

pub use coordinator::{
    Ack, ActionKind, CoordinatorPorts, CoordinatorSettings, CurrentRole, FinishedSession,
    SessionCoordinator, SessionHandle, SessionSpec,
};
pub use handlers::{
    MyRole, ShowMyRoleError, ShowMyRoleHandler, ShowMyRoleQuery, StartLotteryCommand,
    StartLotteryError, StartLotteryHandler, StartLotteryResult, SubmitActionCommand,
    SubmitActionHandler,
};
