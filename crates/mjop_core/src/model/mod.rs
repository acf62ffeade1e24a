//! Maintenance plan domain model.
//!
//! # Responsibility
//! - Define one explicit schema per entity: task template, task occurrence,
//!   offer group, reserve fund and the plan aggregate.
//! - Keep wire naming (`snake_case`, `YYYY-MM-DD`) stable across versions.
//!
//! # Invariants
//! - Every occurrence and group is identified by a stable UUID.
//! - Optional price fields distinguish "unset" (`None`) from zero.

pub mod cash;
pub mod date;
pub mod group;
pub mod plan;
pub mod task;
