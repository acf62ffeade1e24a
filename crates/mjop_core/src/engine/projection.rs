//! Reserve fund balance projection.
//!
//! # Responsibility
//! - Fold a date-ordered list of priced events into the remaining reserve
//!   balance after each event.
//!
//! # Invariants
//! - Output has the same length and order as the input.
//! - Every emitted balance is `>= 0`.
//! - Undated events leave the balance unchanged and do not move the anchor.
//! - Events before `today` only debit; events on or after `today` first
//!   accrue whole months since the anchor, then debit, then re-anchor.
//! - The projection does not sort: dated events out of order are rejected.

use crate::engine::{ensure_non_negative, EngineError, EngineResult};
use crate::model::cash::{BudgetEvent, CashInfo};
use crate::model::date::whole_months_between;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Projects the reserve balance after each of `events`.
///
/// `today` is the simulation's reference date; passing it explicitly keeps
/// the projection deterministic.
///
/// # Errors
/// - `EngineError::UnsortedEvents` when a dated event precedes an earlier one.
/// - `EngineError::InvalidAmount` for a negative price or contribution.
/// - `EngineError::AmountOverflow` when the running balance leaves the
///   decimal range.
pub fn project(
    reserve: &CashInfo,
    events: &[BudgetEvent],
    today: NaiveDate,
) -> EngineResult<Vec<Decimal>> {
    validate_events(reserve, events)?;

    let mut balance = reserve.current_cash;
    let mut anchor = reserve.reserve_date;
    let mut balances = Vec::with_capacity(events.len());

    for event in events {
        let Some(date) = event.date else {
            balances.push(balance);
            continue;
        };

        if date >= today {
            balance = Decimal::from(whole_months_between(anchor, date))
                .checked_mul(reserve.monthly_contribution)
                .and_then(|accrued| balance.checked_add(accrued))
                .ok_or(EngineError::AmountOverflow { field: "balance" })?;
            anchor = date;
        }
        balance = balance
            .checked_sub(event.price)
            .ok_or(EngineError::AmountOverflow { field: "balance" })?
            .max(Decimal::ZERO);
        balances.push(balance);
    }

    Ok(balances)
}

/// Sorts events ascending by date, undated events last.
///
/// The sort is stable, so events sharing a date keep their input order.
pub fn sort_events(events: &mut [BudgetEvent]) {
    events.sort_by_key(|event| (event.date.is_none(), event.date));
}

fn validate_events(reserve: &CashInfo, events: &[BudgetEvent]) -> EngineResult<()> {
    reserve.validate()?;
    let mut last_date: Option<NaiveDate> = None;
    for (index, event) in events.iter().enumerate() {
        ensure_non_negative("price", event.price)?;
        let Some(date) = event.date else {
            continue;
        };
        if last_date.is_some_and(|last| date < last) {
            return Err(EngineError::UnsortedEvents { index });
        }
        last_date = Some(date);
    }
    Ok(())
}
