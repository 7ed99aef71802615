//! In-memory collaborator adapters.
//!
//! Used by the console binary and by tests in place of a real chat
//! platform.

mod board;
mod directory;
mod workspaces;

pub use board::{NoticeFeed, ReactionBoard};
pub use directory::StaticDirectory;
pub use workspaces::InMemoryWorkspaces;
