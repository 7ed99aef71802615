//! Domain layer containing the lottery rules and types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, errors, events, state machine)
//! - `catalog` - Role catalog and role metadata
//! - `assignment` - Assignment strategies and infeasibility diagnosis
//! - `lottery` - Selection session aggregate, modes and lifecycle events

pub mod assignment;
pub mod catalog;
pub mod foundation;
pub mod lottery;

