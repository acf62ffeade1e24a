//! Effective price resolution for one task occurrence.
//!
//! Priority, first set value wins (`Some(0)` counts as set):
//! 1. group share, when grouped and the group prices jointly (the last
//!    member takes the cent remainder);
//!    individual override instead, when the group prices per member;
//! 2. invoice price;
//! 3. offer price;
//! 4. estimated (escalated) cost;
//! 5. zero.

use crate::engine::{ensure_non_negative, round_money, EngineError, EngineResult, MONEY_SCALE};
use crate::model::group::TaskGroup;
use crate::model::task::TaskOccurrence;
use rust_decimal::{Decimal, RoundingStrategy};

/// Which rule produced a resolved price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// Even share of the group's aggregate cost.
    GroupShare,
    /// Member override on an individually priced group.
    IndividualCost,
    Invoice,
    Offer,
    Estimate,
    /// Nothing set; resolved to zero.
    Unpriced,
}

/// Resolved price with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrice {
    pub amount: Decimal,
    pub source: PriceSource,
}

/// Resolves the effective price of `occurrence`.
///
/// `group` must be the group the occurrence links to, if any.
///
/// # Errors
/// - `EngineError::MissingGroup` when the occurrence links to a group but
///   `group` is `None`, a different group, or a group that does not list it.
/// - `EngineError::InvalidAmount` when the winning price is negative.
pub fn resolve(occurrence: &TaskOccurrence, group: Option<&TaskGroup>) -> EngineResult<Decimal> {
    explain(occurrence, group).map(|resolved| resolved.amount)
}

/// Same as [`resolve`], also reporting which rule won.
pub fn explain(
    occurrence: &TaskOccurrence,
    group: Option<&TaskGroup>,
) -> EngineResult<ResolvedPrice> {
    let group = linked_group(occurrence, group)?;

    let candidates = [
        group.and_then(|group| group_price(occurrence, group)),
        occurrence.invoice_price.map(|amount| (amount, PriceSource::Invoice)),
        occurrence.offer_price.map(|amount| (amount, PriceSource::Offer)),
        occurrence
            .estimated_cost
            .map(|amount| (amount, PriceSource::Estimate)),
    ];

    let (amount, source) = candidates
        .into_iter()
        .flatten()
        .next()
        .unwrap_or((Decimal::ZERO, PriceSource::Unpriced));
    ensure_non_negative("price", amount)?;
    Ok(ResolvedPrice { amount, source })
}

/// Resolves every occurrence, looking groups up by ID.
pub fn resolve_all<'a>(
    occurrences: impl IntoIterator<Item = &'a TaskOccurrence>,
    groups: &[TaskGroup],
) -> EngineResult<Vec<Decimal>> {
    occurrences
        .into_iter()
        .map(|occurrence| {
            let group = match occurrence.group_id {
                Some(group_id) => Some(
                    groups
                        .iter()
                        .find(|group| group.id == group_id)
                        .ok_or(EngineError::MissingGroup(group_id))?,
                ),
                None => None,
            };
            resolve(occurrence, group)
        })
        .collect()
}

fn linked_group<'g>(
    occurrence: &TaskOccurrence,
    group: Option<&'g TaskGroup>,
) -> EngineResult<Option<&'g TaskGroup>> {
    let Some(group_id) = occurrence.group_id else {
        return Ok(None);
    };
    match group {
        Some(group) if group.id == group_id && group.contains(occurrence.id) => Ok(Some(group)),
        _ => Err(EngineError::MissingGroup(group_id)),
    }
}

/// Joint shares are cut to whole cents; the last member carries the
/// remainder, so member prices always sum to the group cost.
fn group_price(occurrence: &TaskOccurrence, group: &TaskGroup) -> Option<(Decimal, PriceSource)> {
    if group.assign_prices_individually {
        return group
            .member(occurrence.id)
            .and_then(|member| member.individual_cost)
            .map(|amount| (amount, PriceSource::IndividualCost));
    }
    let cost = round_money(group.cost?);
    let count = group.members.len();
    let share = (cost / Decimal::from(count.max(1)))
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero);
    let is_last = group
        .members
        .last()
        .is_some_and(|member| member.occurrence_id == occurrence.id);
    let amount = if is_last {
        cost - share * Decimal::from(count - 1)
    } else {
        share
    };
    Some((amount, PriceSource::GroupShare))
}
