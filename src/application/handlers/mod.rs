//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod lottery;

pub use lottery::{
    // Commands
    StartLotteryCommand, StartLotteryError, StartLotteryHandler, StartLotteryResult,
    SubmitActionCommand, SubmitActionHandler,
    // Queries
    MyRole, ShowMyRoleError, ShowMyRoleHandler, ShowMyRoleQuery,
};
