//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the lottery core to its surroundings:
//! - `events` - Event bus and event handlers
//! - `memory` - In-process presentation, directory and workspace adapters
//! - `console` - Line-oriented driver used by the binary

pub mod console;
pub mod events;
pub mod memory;

pub use events::{AuditLog, InMemoryEventBus};
pub use memory::{InMemoryWorkspaces, ReactionBoard, StaticDirectory};
