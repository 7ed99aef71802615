//! Role catalog module.
//!
//! Pure data: the roles a lottery can hand out and their display metadata.
//! Catalogs are immutable and shared read-only across all sessions.

#[allow(clippy::module_inception)]
mod catalog;
mod role;

pub use catalog::RoleCatalog;
pub use role::Role;
