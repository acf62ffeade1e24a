//! Offer group linking.
//!
//! # Responsibility
//! - Link a batch of occurrences to a new group and price them through it.
//! - Edit group cost/name fields and re-price members.
//! - Unlink all members when a group is deleted.
//!
//! # Invariants
//! - Linking never adds, removes or re-dates occurrences.
//! - Every operation validates and prices first, then mutates; an error
//!   leaves the occurrences untouched.
//! - After unlinking, no occurrence references the deleted group.

use crate::engine::pricing::resolve;
use crate::engine::{EngineError, EngineResult};
use crate::model::group::{GroupMember, GroupSettings, TaskGroup, TaskGroupId};
use crate::model::task::{TaskOccurrence, TaskOccurrenceId};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Creates a group over `member_ids` and links those occurrences to it.
///
/// # Errors
/// - `EngineError::EmptyGroup` when `member_ids` is empty.
/// - `EngineError::UnknownOccurrence` when a member or override key is not
///   among `occurrences`/`member_ids`.
/// - `EngineError::AlreadyGrouped` when a member links to another group.
/// - `EngineError::InvalidAmount` for negative group or member prices.
pub fn create_group<'a>(
    occurrences: impl IntoIterator<Item = &'a mut TaskOccurrence>,
    member_ids: &[TaskOccurrenceId],
    settings: &GroupSettings,
) -> EngineResult<TaskGroup> {
    let mut unique = BTreeSet::new();
    let member_ids: Vec<TaskOccurrenceId> = member_ids
        .iter()
        .copied()
        .filter(|id| unique.insert(*id))
        .collect();

    let group = build_group(Uuid::new_v4(), &member_ids, settings)?;
    let mut members = collect_members(occurrences, &group)?;
    for occurrence in &members {
        if let Some(existing) = occurrence.group_id {
            return Err(EngineError::AlreadyGrouped {
                occurrence: occurrence.id,
                group: existing,
            });
        }
    }

    let prices = price_members(&members, Some(&group))?;
    for (occurrence, price) in members.iter_mut().zip(prices) {
        occurrence.group_id = Some(group.id);
        occurrence.resolved_cost = price;
    }
    Ok(group)
}

/// Applies `settings` to `group` and re-prices its members.
///
/// The member list is kept; dates and occurrence count never change.
pub fn edit_group<'a>(
    group: &mut TaskGroup,
    settings: &GroupSettings,
    occurrences: impl IntoIterator<Item = &'a mut TaskOccurrence>,
) -> EngineResult<()> {
    let member_ids: Vec<TaskOccurrenceId> = group
        .members
        .iter()
        .map(|member| member.occurrence_id)
        .collect();
    let updated = build_group(group.id, &member_ids, settings)?;
    let mut members = collect_members(occurrences, &updated)?;
    if let Some(stray) = members.iter().find(|task| task.group_id != Some(group.id)) {
        return Err(EngineError::MissingGroup(stray.group_id.unwrap_or(group.id)));
    }

    let prices = price_members(&members, Some(&updated))?;
    for (occurrence, price) in members.iter_mut().zip(prices) {
        occurrence.resolved_cost = price;
    }
    *group = updated;
    Ok(())
}

/// Removes `group_id` from `groups` and unlinks its members.
///
/// Occurrences are never deleted; only their group reference is cleared.
///
/// # Errors
/// - `EngineError::MissingGroup` when `group_id` is not in `groups`.
pub fn delete_group<'a>(
    groups: &mut Vec<TaskGroup>,
    group_id: TaskGroupId,
    occurrences: impl IntoIterator<Item = &'a mut TaskOccurrence>,
) -> EngineResult<TaskGroup> {
    let index = groups
        .iter()
        .position(|group| group.id == group_id)
        .ok_or(EngineError::MissingGroup(group_id))?;
    unlink_group(group_id, occurrences)?;
    Ok(groups.remove(index))
}

/// Unlinks every occurrence from `group_id` and re-prices it on its own.
///
/// Returns the number of occurrences unlinked.
pub fn unlink_group<'a>(
    group_id: TaskGroupId,
    occurrences: impl IntoIterator<Item = &'a mut TaskOccurrence>,
) -> EngineResult<usize> {
    let mut linked: Vec<&mut TaskOccurrence> = occurrences
        .into_iter()
        .filter(|occurrence| occurrence.group_id == Some(group_id))
        .collect();

    let prices = linked
        .iter()
        .map(|occurrence| {
            let mut detached = (**occurrence).clone();
            detached.group_id = None;
            resolve(&detached, None)
        })
        .collect::<EngineResult<Vec<Decimal>>>()?;

    for (occurrence, price) in linked.iter_mut().zip(prices) {
        occurrence.group_id = None;
        occurrence.resolved_cost = price;
    }
    Ok(linked.len())
}

fn build_group(
    id: TaskGroupId,
    member_ids: &[TaskOccurrenceId],
    settings: &GroupSettings,
) -> EngineResult<TaskGroup> {
    if let Some(stray) = settings
        .individual_costs
        .keys()
        .find(|id| !member_ids.contains(id))
    {
        return Err(EngineError::UnknownOccurrence(*stray));
    }

    let group = TaskGroup {
        id,
        name: settings.name.clone(),
        group_date: settings.group_date,
        cost: settings.cost,
        assign_prices_individually: settings.assign_prices_individually,
        members: member_ids
            .iter()
            .map(|occurrence_id| GroupMember {
                occurrence_id: *occurrence_id,
                individual_cost: settings.individual_costs.get(occurrence_id).copied(),
            })
            .collect(),
    };
    group.validate()?;
    Ok(group)
}

fn collect_members<'a>(
    occurrences: impl IntoIterator<Item = &'a mut TaskOccurrence>,
    group: &TaskGroup,
) -> EngineResult<Vec<&'a mut TaskOccurrence>> {
    let mut members: Vec<&mut TaskOccurrence> = occurrences
        .into_iter()
        .filter(|occurrence| group.contains(occurrence.id))
        .collect();
    if let Some(missing) = group
        .members
        .iter()
        .find(|member| !members.iter().any(|task| task.id == member.occurrence_id))
    {
        return Err(EngineError::UnknownOccurrence(missing.occurrence_id));
    }
    members.sort_by_key(|task| {
        group
            .members
            .iter()
            .position(|member| member.occurrence_id == task.id)
    });
    Ok(members)
}

fn price_members(
    members: &[&mut TaskOccurrence],
    group: Option<&TaskGroup>,
) -> EngineResult<Vec<Decimal>> {
    members
        .iter()
        .map(|occurrence| {
            let mut linked = (**occurrence).clone();
            linked.group_id = group.map(|group| group.id);
            resolve(&linked, group)
        })
        .collect()
}
