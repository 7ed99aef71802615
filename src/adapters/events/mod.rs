//! Event bus adapters.
//!
//! - `InMemoryEventBus` - In-process bus with event capture
//! - `AuditLog` - Handler that logs every lifecycle event

mod audit_log;
mod in_memory;

pub use audit_log::AuditLog;
pub use in_memory::InMemoryEventBus;
