//! Core use-case services.
//!
//! # Responsibility
//! - Hold caller-owned plan state and drive the pure engine over it.
//! - Keep CLI/UI layers decoupled from engine internals.

pub mod plan_service;
