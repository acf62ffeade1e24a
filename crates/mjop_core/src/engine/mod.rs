//! Scheduling and reserve-fund projection engine.
//!
//! # Responsibility
//! - Expand task templates into dated occurrences with cost escalation.
//! - Resolve the effective price of one occurrence from competing fields.
//! - Fold priced, dated events into a running reserve-fund balance.
//! - Link batches of occurrences to shared offer groups.
//!
//! # Invariants
//! - Every function here is pure over its explicit inputs: no I/O, no
//!   global state, no logging.
//! - Calls are all-or-nothing: inputs are validated before caller-owned
//!   collections are touched.

use crate::model::group::TaskGroupId;
use crate::model::task::TaskOccurrenceId;
use rust_decimal::{Decimal, RoundingStrategy};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod escalation;
pub mod grouping;
pub mod pricing;
pub mod projection;
pub mod recurrence;

/// Number of decimal places kept for every money value.
pub const MONEY_SCALE: u32 = 2;

pub type EngineResult<T> = Result<T, EngineError>;

/// Validation failures reported by engine components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Period or horizon is not positive, or the occurrence count overflows.
    InvalidRecurrence(String),
    /// Indexation rate is negative or non-finite.
    InvalidRate(String),
    /// Date input is malformed or date arithmetic left the calendar range.
    InvalidDate(String),
    /// Occurrence references a group that is not available.
    MissingGroup(TaskGroupId),
    /// Money input is negative.
    InvalidAmount { field: &'static str, value: Decimal },
    /// Money arithmetic left the decimal range.
    AmountOverflow { field: &'static str },
    /// Dated projection events are not in ascending order.
    UnsortedEvents { index: usize },
    /// Group creation received no member occurrences.
    EmptyGroup,
    /// Occurrence is already linked to another group.
    AlreadyGrouped {
        occurrence: TaskOccurrenceId,
        group: TaskGroupId,
    },
    /// Referenced occurrence is not part of the supplied collection.
    UnknownOccurrence(TaskOccurrenceId),
    /// Urgency outside `1..=5`.
    InvalidUrgency(u8),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecurrence(details) => write!(f, "invalid recurrence: {details}"),
            Self::InvalidRate(details) => write!(f, "invalid indexation rate: {details}"),
            Self::InvalidDate(details) => write!(f, "invalid date: {details}"),
            Self::MissingGroup(id) => write!(f, "task group not found: {id}"),
            Self::InvalidAmount { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::AmountOverflow { field } => {
                write!(f, "{field} is out of the supported decimal range")
            }
            Self::UnsortedEvents { index } => {
                write!(f, "budget event at index {index} is earlier than its predecessor")
            }
            Self::EmptyGroup => write!(f, "task group must have at least one member"),
            Self::AlreadyGrouped { occurrence, group } => write!(
                f,
                "task occurrence {occurrence} already belongs to group {group}"
            ),
            Self::UnknownOccurrence(id) => write!(f, "task occurrence not found: {id}"),
            Self::InvalidUrgency(value) => {
                write!(f, "urgency must be within 1..=5, got {value}")
            }
        }
    }
}

impl Error for EngineError {}

/// Rounds a money value to cents, midpoint away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rejects negative money input for `field`.
pub(crate) fn ensure_non_negative(field: &'static str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::InvalidAmount { field, value });
    }
    Ok(())
}
