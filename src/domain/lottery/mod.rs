//! Lottery module - the selection session aggregate and its vocabulary.
//!
//! # Modes
//!
//! - `OpenLottery` - anyone picks a numbered token, a shuffle hands out roles
//! - `InstantPick` - roster members claim hidden tokens bound to roles
//! - `ExclusionThenLottery` - roster members exclude roles, then one draw
//!
//! # Lifecycle
//!
//! `Collecting → Locking → Assigning → Complete | Infeasible`, or
//! `Collecting → TimedOut | Cancelled`. Terminal states never change again.

mod errors;
pub mod events;
mod mode;
mod outcome;
mod pick;
mod progress;
mod session;
mod state;

pub use errors::LotteryError;
pub use events::LotteryEvent;
pub use mode::SessionMode;
pub use outcome::TerminalOutcome;
pub use pick::{Pick, PickToken, MAX_TOKENS};
pub use progress::{Claim, SessionProgress, SlotProgress};
pub use session::{DrawInput, PickOutcome, SelectionSession, SessionDraft};
pub use state::SessionState;
