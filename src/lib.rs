//! Role Lottery - interactive role draws for small groups
//!
//! This crate runs multi-participant lottery sessions that hand every
//! participant exactly one role from a small catalog, optionally honoring
//! roles each participant refuses. Input is collected live from a shared
//! message, and a single randomized assignment runs once input closes.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
