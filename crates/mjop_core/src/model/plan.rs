//! Maintenance plan aggregate and its document form.
//!
//! # Responsibility
//! - Hold the caller-owned collections the engine operates on: elements
//!   with their task lists, offer groups, and reserve fund settings.
//! - Define the serde document a plan is loaded from.

use crate::model::cash::CashInfo;
use crate::model::date::serde_date;
use crate::model::group::{GroupSettings, TaskGroup, TaskGroupId};
use crate::model::task::{TaskOccurrence, TaskOccurrenceId, TaskSchedule, TaskTemplate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one building element.
pub type ElementId = Uuid;

/// Building element (roof, facade, installation) owning a task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskOccurrence>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tasks: Vec::new(),
        }
    }
}

/// Full plan state: elements, groups and reserve fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePlan {
    pub cash: CashInfo,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub groups: Vec<TaskGroup>,
}

impl MaintenancePlan {
    pub fn new(cash: CashInfo) -> Self {
        Self {
            cash,
            elements: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Total number of occurrences across all elements.
    pub fn occurrence_count(&self) -> usize {
        self.elements.iter().map(|element| element.tasks.len()).sum()
    }

    pub fn occurrences(&self) -> impl Iterator<Item = &TaskOccurrence> {
        self.elements.iter().flat_map(|element| element.tasks.iter())
    }

    pub fn occurrences_mut(&mut self) -> impl Iterator<Item = &mut TaskOccurrence> {
        self.elements
            .iter_mut()
            .flat_map(|element| element.tasks.iter_mut())
    }

    pub fn find_occurrence(&self, id: TaskOccurrenceId) -> Option<&TaskOccurrence> {
        self.occurrences().find(|task| task.id == id)
    }

    pub fn find_group(&self, id: TaskGroupId) -> Option<&TaskGroup> {
        self.groups.iter().find(|group| group.id == id)
    }
}

/// Task entry of a plan document: a template plus how to schedule it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub template: TaskTemplate,
    pub schedule: TaskSchedule,
    /// Recurrence anchor; defaults to the template due date.
    #[serde(default, with = "crate::model::date::serde_opt_date")]
    pub anchor: Option<NaiveDate>,
}

/// Element entry of a plan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRequest {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskRequest>,
}

/// Group entry of a plan document; members are selected by task name and
/// due date since occurrence IDs are generated at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRequest {
    #[serde(flatten)]
    pub settings: GroupSettings,
    pub members: Vec<GroupMemberRef>,
}

/// Selects one generated occurrence by task name and due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMemberRef {
    pub task: String,
    #[serde(with = "serde_date")]
    pub due_date: NaiveDate,
}

/// Serialized plan input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub cash: CashInfo,
    #[serde(default)]
    pub elements: Vec<ElementRequest>,
    #[serde(default)]
    pub groups: Vec<GroupRequest>,
}
