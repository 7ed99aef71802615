//! Lottery command and query handlers.

mod show_my_role;
mod start_lottery;
mod submit_action;

pub use show_my_role::{MyRole, ShowMyRoleError, ShowMyRoleHandler, ShowMyRoleQuery};
pub use start_lottery::{
    StartLotteryCommand, StartLotteryError, StartLotteryHandler, StartLotteryResult,
};
pub use submit_action::{SubmitActionCommand, SubmitActionHandler};
