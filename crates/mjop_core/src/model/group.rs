//! Offer group model.
//!
//! An offer group bundles occurrences that share one contractor quote, so
//! the quote can be costed jointly or split per member.
//!
//! # Invariants
//! - `members` is never empty while the group exists.
//! - A member occurrence carries `group_id == Some(group.id)`.

use crate::engine::{ensure_non_negative, EngineError, EngineResult};
use crate::model::date::serde_date;
use crate::model::task::TaskOccurrenceId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identifier for one offer group.
pub type TaskGroupId = Uuid;

/// Reference from a group to one member occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub occurrence_id: TaskOccurrenceId,
    /// Per-member price used when the group assigns prices individually.
    #[serde(default)]
    pub individual_cost: Option<Decimal>,
}

/// Named bundle of occurrences costed through one quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroup {
    pub id: TaskGroupId,
    pub name: String,
    #[serde(with = "serde_date")]
    pub group_date: NaiveDate,
    /// Aggregate quote/invoice price for the whole group.
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub assign_prices_individually: bool,
    pub members: Vec<GroupMember>,
}

impl TaskGroup {
    /// Returns the member entry for `occurrence_id`, if linked.
    pub fn member(&self, occurrence_id: TaskOccurrenceId) -> Option<&GroupMember> {
        self.members
            .iter()
            .find(|member| member.occurrence_id == occurrence_id)
    }

    /// Returns whether `occurrence_id` is a member.
    pub fn contains(&self, occurrence_id: TaskOccurrenceId) -> bool {
        self.member(occurrence_id).is_some()
    }

    /// Validates member list and money fields.
    pub fn validate(&self) -> EngineResult<()> {
        if self.members.is_empty() {
            return Err(EngineError::EmptyGroup);
        }
        if let Some(cost) = self.cost {
            ensure_non_negative("group_cost", cost)?;
        }
        for member in &self.members {
            if let Some(cost) = member.individual_cost {
                ensure_non_negative("individual_cost", cost)?;
            }
        }
        Ok(())
    }
}

/// Editable group fields, used for both creation and edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettings {
    pub name: String,
    #[serde(with = "serde_date")]
    pub group_date: NaiveDate,
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub assign_prices_individually: bool,
    /// Individual price overrides keyed by member occurrence.
    #[serde(default)]
    pub individual_costs: BTreeMap<TaskOccurrenceId, Decimal>,
}

impl GroupSettings {
    pub fn new(name: impl Into<String>, group_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            group_date,
            cost: None,
            assign_prices_individually: false,
            individual_costs: BTreeMap::new(),
        }
    }

    /// Sets the aggregate group cost.
    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Switches the group to per-member pricing with the given overrides.
    pub fn with_individual_costs(
        mut self,
        costs: impl IntoIterator<Item = (TaskOccurrenceId, Decimal)>,
    ) -> Self {
        self.assign_prices_individually = true;
        self.individual_costs = costs.into_iter().collect();
        self
    }
}
