//! Recurring task expansion.
//!
//! # Responsibility
//! - Turn one template plus its schedule into an ordered list of dated
//!   occurrences.
//! - Apply stepwise cost indexation and spread any contract cost.
//!
//! # Invariants
//! - `len == floor(total_years * 12 / period_months)` for recurring input.
//! - `Once` always yields exactly one occurrence.
//! - `due_date` is non-decreasing across the returned list.
//! - Period dates are offsets from the anchor (`anchor + i * period`), so
//!   month-end clamping never drifts across occurrences.

use crate::engine::escalation::{CostEscalator, IndexationRate};
use crate::engine::{ensure_non_negative, round_money, EngineError, EngineResult};
use crate::model::date::{add_days, add_months};
use crate::model::task::{RecurrenceSettings, TaskOccurrence, TaskSchedule, TaskTemplate};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Expands `template` according to `schedule`, anchored at `anchor`.
///
/// # Errors
/// - `EngineError::InvalidRecurrence` for a non-positive period or horizon.
/// - `EngineError::InvalidRate` for a negative indexation rate.
/// - `EngineError::InvalidAmount` for negative base or contract cost.
/// - `EngineError::InvalidDate` when the last period date falls outside the
///   calendar; this is checked before any occurrence is built.
/// - `EngineError::AmountOverflow` when an estimate leaves the decimal range.
pub fn expand(
    template: &TaskTemplate,
    schedule: &TaskSchedule,
    anchor: NaiveDate,
) -> EngineResult<Vec<TaskOccurrence>> {
    template.validate()?;
    match schedule {
        TaskSchedule::Once => expand_once(template).map(|occurrence| vec![occurrence]),
        TaskSchedule::Recurring(settings) => expand_recurring(template, settings, anchor),
    }
}

/// Number of occurrences a recurring schedule produces.
pub fn occurrence_count(settings: &RecurrenceSettings) -> EngineResult<usize> {
    let period_months = settings.period.months()?;
    if settings.total_years <= Decimal::ZERO {
        return Err(EngineError::InvalidRecurrence(format!(
            "total_years must be greater than 0, got {}",
            settings.total_years
        )));
    }

    let count = settings
        .total_years
        .checked_mul(Decimal::from(12))
        .and_then(|months| months.checked_div(Decimal::from(period_months)))
        .map(|ratio| ratio.floor())
        .and_then(|ratio| ratio.to_usize())
        .ok_or_else(|| {
            EngineError::InvalidRecurrence(format!(
                "{} years over {period_months} month periods is not countable",
                settings.total_years
            ))
        })?;
    Ok(count)
}

fn expand_once(template: &TaskTemplate) -> EngineResult<TaskOccurrence> {
    let mut occurrence =
        TaskOccurrence::from_template(template, template.due_date, template.base_cost);
    if template.offer_needed {
        if let Some(start) = template.start_date {
            let end = add_days(start, i64::from(template.duration_days))?;
            occurrence.planned_work_date = Some(start);
            occurrence.start_date = Some(start);
            occurrence.end_date = Some(end);
        }
    }
    Ok(occurrence)
}

fn expand_recurring(
    template: &TaskTemplate,
    settings: &RecurrenceSettings,
    anchor: NaiveDate,
) -> EngineResult<Vec<TaskOccurrence>> {
    let rate = IndexationRate::new(settings.indexation_rate_percent)?;
    let count = occurrence_count(settings)?;
    let period_months = settings.period.months()?;
    let contract_share = contract_share(settings.contract_cost, count)?;

    let mut escalator = if settings.indexation_enabled {
        CostEscalator::new(template.base_cost, rate, anchor)
    } else {
        CostEscalator::disabled(template.base_cost, anchor)
    };

    if let Some(last) = count.checked_sub(1) {
        add_months(anchor, period_offset(last, period_months)?)?;
    }

    let mut occurrences = Vec::with_capacity(count);
    let mut previous: Option<(NaiveDate, NaiveDate)> = None;
    for index in 0..count {
        let period_date = add_months(anchor, period_offset(index, period_months)?)?;
        let estimate = escalator
            .cost_at(period_date)?
            .checked_add(contract_share)
            .ok_or(EngineError::AmountOverflow {
                field: "estimated_cost",
            })?;

        if !template.offer_needed {
            occurrences.push(TaskOccurrence::from_template(template, period_date, estimate));
            continue;
        }

        let start = match previous {
            None => template.start_date.unwrap_or(anchor),
            Some((previous_period, previous_start)) => {
                add_days(previous_start, (period_date - previous_period).num_days())?
            }
        };
        let end = add_days(start, i64::from(template.duration_days))?;
        let mut occurrence = TaskOccurrence::from_template(template, end, estimate);
        occurrence.planned_work_date = Some(start);
        occurrence.start_date = Some(start);
        occurrence.end_date = Some(end);
        occurrences.push(occurrence);
        previous = Some((period_date, start));
    }

    Ok(occurrences)
}

// Months from the anchor to period `index`.
fn period_offset(index: usize, period_months: u32) -> EngineResult<u32> {
    u32::try_from(index)
        .ok()
        .and_then(|index| index.checked_mul(period_months))
        .ok_or_else(|| {
            EngineError::InvalidRecurrence(format!("occurrence {index} offset overflows"))
        })
}

fn contract_share(contract_cost: Option<Decimal>, count: usize) -> EngineResult<Decimal> {
    let Some(contract_cost) = contract_cost else {
        return Ok(Decimal::ZERO);
    };
    ensure_non_negative("contract_cost", contract_cost)?;
    if count == 0 {
        return Ok(Decimal::ZERO);
    }
    Ok(round_money(contract_cost / Decimal::from(count)))
}
