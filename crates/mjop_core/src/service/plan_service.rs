//! Maintenance plan use-case service.
//!
//! # Responsibility
//! - Own the plan state (elements, task lists, groups, reserve fund) and
//!   route every change through the engine.
//! - Re-run price resolution on occurrences whose price inputs changed.
//! - Produce per-row remaining balances for display.
//!
//! # Invariants
//! - Occurrences are appended once at scheduling time and never re-expanded.
//! - Failed operations leave the plan unchanged.
//! - Deleting a group keeps the occurrence count unchanged.

use crate::engine::grouping::{create_group, delete_group, edit_group};
use crate::engine::pricing::{resolve, resolve_all};
use crate::engine::projection::project;
use crate::engine::recurrence::expand;
use crate::engine::{ensure_non_negative, EngineError};
use crate::model::cash::{BudgetEvent, CashInfo};
use crate::model::group::{GroupSettings, TaskGroupId};
use crate::model::plan::{Element, ElementId, MaintenancePlan, PlanDocument};
use crate::model::task::{TaskOccurrence, TaskOccurrenceId, TaskSchedule, TaskTemplate};
use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from plan service operations.
#[derive(Debug)]
pub enum PlanServiceError {
    /// Element or task name is blank after trim.
    InvalidName,
    /// Target element does not exist.
    ElementNotFound(ElementId),
    /// Target occurrence does not exist.
    TaskNotFound(TaskOccurrenceId),
    /// Plan document group member matches no unlinked occurrence.
    MemberNotFound { task: String, due_date: NaiveDate },
    /// Engine validation failure.
    Engine(EngineError),
}

impl Display for PlanServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "name must not be blank"),
            Self::ElementNotFound(id) => write!(f, "element not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task occurrence not found: {id}"),
            Self::MemberNotFound { task, due_date } => {
                write!(f, "no ungrouped task `{task}` due on {due_date}")
            }
            Self::Engine(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlanServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EngineError> for PlanServiceError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::UnknownOccurrence(id) => Self::TaskNotFound(id),
            other => Self::Engine(other),
        }
    }
}

pub type PlanServiceResult<T> = Result<T, PlanServiceError>;

/// One display row: an occurrence with its price and remaining balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBalance {
    pub element_id: ElementId,
    pub occurrence_id: TaskOccurrenceId,
    pub due_date: NaiveDate,
    pub price: Decimal,
    pub remaining_balance: Decimal,
}

/// Plan state container.
pub struct PlanService {
    plan: MaintenancePlan,
}

impl PlanService {
    /// Creates a service over an existing plan.
    pub fn new(plan: MaintenancePlan) -> Self {
        Self { plan }
    }

    /// Builds a plan from its document form.
    ///
    /// Tasks are expanded in document order; groups are linked afterwards,
    /// each member picking the first ungrouped occurrence with matching
    /// task name and due date.
    pub fn from_document(document: &PlanDocument) -> PlanServiceResult<Self> {
        let mut service = Self::new(MaintenancePlan::new(document.cash.clone()));
        service.plan.cash.validate()?;

        for element_request in &document.elements {
            let element_id = service.add_element(element_request.name.as_str())?;
            for task in &element_request.tasks {
                service.schedule_task(element_id, &task.template, &task.schedule, task.anchor)?;
            }
        }

        for group_request in &document.groups {
            let mut member_ids: Vec<TaskOccurrenceId> = Vec::new();
            for member in &group_request.members {
                let found = service
                    .plan
                    .occurrences()
                    .find(|task| {
                        task.name == member.task
                            && task.due_date == member.due_date
                            && task.group_id.is_none()
                            && !member_ids.contains(&task.id)
                    })
                    .map(|task| task.id)
                    .ok_or_else(|| PlanServiceError::MemberNotFound {
                        task: member.task.clone(),
                        due_date: member.due_date,
                    })?;
                member_ids.push(found);
            }
            service.create_group(&member_ids, &group_request.settings)?;
        }

        info!(
            "event=plan_load module=plan status=ok elements={} occurrences={} groups={}",
            service.plan.elements.len(),
            service.plan.occurrence_count(),
            service.plan.groups.len()
        );
        Ok(service)
    }

    pub fn plan(&self) -> &MaintenancePlan {
        &self.plan
    }

    pub fn into_plan(self) -> MaintenancePlan {
        self.plan
    }

    /// Adds an empty element and returns its ID.
    pub fn add_element(&mut self, name: impl Into<String>) -> PlanServiceResult<ElementId> {
        let name = normalize_name(name.into())?;
        let element = Element::new(name);
        let id = element.id;
        self.plan.elements.push(element);
        debug!("event=element_add module=plan status=ok element={id}");
        Ok(id)
    }

    /// Expands `template` and appends the occurrences to the element's list.
    ///
    /// `anchor` defaults to the template's due date.
    pub fn schedule_task(
        &mut self,
        element_id: ElementId,
        template: &TaskTemplate,
        schedule: &TaskSchedule,
        anchor: Option<NaiveDate>,
    ) -> PlanServiceResult<Vec<TaskOccurrenceId>> {
        if template.name.trim().is_empty() {
            return Err(PlanServiceError::InvalidName);
        }
        let element_index = self.element_index(element_id)?;
        let occurrences = expand(template, schedule, anchor.unwrap_or(template.due_date))?;
        let ids: Vec<TaskOccurrenceId> = occurrences.iter().map(|task| task.id).collect();

        self.plan.elements[element_index].tasks.extend(occurrences);
        info!(
            "event=task_schedule module=plan status=ok element={element_id} occurrences={}",
            ids.len()
        );
        Ok(ids)
    }

    /// Sets or clears the contractor offer price of one occurrence.
    pub fn set_offer_price(
        &mut self,
        id: TaskOccurrenceId,
        price: Option<Decimal>,
    ) -> PlanServiceResult<Decimal> {
        if let Some(price) = price {
            ensure_non_negative("offer_price", price)?;
        }
        self.update_occurrence(id, |task| task.offer_price = price)
    }

    /// Sets or clears the invoice price of one occurrence.
    pub fn set_invoice_price(
        &mut self,
        id: TaskOccurrenceId,
        price: Option<Decimal>,
    ) -> PlanServiceResult<Decimal> {
        if let Some(price) = price {
            ensure_non_negative("invoice_price", price)?;
        }
        self.update_occurrence(id, |task| task.invoice_price = price)
    }

    /// Records whether the offer for one occurrence was accepted.
    pub fn accept_offer(&mut self, id: TaskOccurrenceId, accepted: bool) -> PlanServiceResult<()> {
        self.update_occurrence(id, |task| task.offer_accepted = accepted)
            .map(|_| ())
    }

    /// Replaces the reserve fund settings.
    pub fn update_cash(&mut self, cash: CashInfo) -> PlanServiceResult<()> {
        cash.validate()?;
        self.plan.cash = cash;
        debug!("event=cash_update module=plan status=ok");
        Ok(())
    }

    /// Groups the given occurrences under one offer group.
    pub fn create_group(
        &mut self,
        member_ids: &[TaskOccurrenceId],
        settings: &GroupSettings,
    ) -> PlanServiceResult<TaskGroupId> {
        let group = create_group(self.plan.occurrences_mut(), member_ids, settings)?;
        let id = group.id;
        info!(
            "event=group_create module=plan status=ok group={id} members={}",
            group.members.len()
        );
        self.plan.groups.push(group);
        Ok(id)
    }

    /// Updates group name/date/cost fields and re-prices its members.
    pub fn edit_group(
        &mut self,
        group_id: TaskGroupId,
        settings: &GroupSettings,
    ) -> PlanServiceResult<()> {
        let MaintenancePlan {
            elements, groups, ..
        } = &mut self.plan;
        let group = groups
            .iter_mut()
            .find(|group| group.id == group_id)
            .ok_or(EngineError::MissingGroup(group_id))?;
        edit_group(
            group,
            settings,
            elements.iter_mut().flat_map(|element| element.tasks.iter_mut()),
        )?;
        debug!("event=group_edit module=plan status=ok group={group_id}");
        Ok(())
    }

    /// Deletes a group, keeping its former members. Returns how many
    /// occurrences were unlinked.
    pub fn delete_group(&mut self, group_id: TaskGroupId) -> PlanServiceResult<usize> {
        let MaintenancePlan {
            elements, groups, ..
        } = &mut self.plan;
        let removed = delete_group(
            groups,
            group_id,
            elements.iter_mut().flat_map(|element| element.tasks.iter_mut()),
        )?;
        info!(
            "event=group_delete module=plan status=ok group={group_id} members={}",
            removed.members.len()
        );
        Ok(removed.members.len())
    }

    /// Resolves every price and projects the reserve balance per occurrence.
    ///
    /// Rows come back in projection order: ascending due date, ties kept in
    /// element/task-list order.
    pub fn remaining_balances(&self, today: NaiveDate) -> PlanServiceResult<Vec<TaskBalance>> {
        let mut rows: Vec<(ElementId, &TaskOccurrence)> = self
            .plan
            .elements
            .iter()
            .flat_map(|element| element.tasks.iter().map(move |task| (element.id, task)))
            .collect();
        rows.sort_by_key(|(_, task)| task.due_date);

        let prices = resolve_all(rows.iter().map(|(_, task)| *task), &self.plan.groups)?;
        let events: Vec<BudgetEvent> = rows
            .iter()
            .zip(&prices)
            .map(|((_, task), price)| BudgetEvent::dated(task.due_date, *price))
            .collect();
        let balances = project(&self.plan.cash, &events, today)?;

        Ok(rows
            .into_iter()
            .zip(prices)
            .zip(balances)
            .map(|(((element_id, task), price), remaining_balance)| TaskBalance {
                element_id,
                occurrence_id: task.id,
                due_date: task.due_date,
                price,
                remaining_balance,
            })
            .collect())
    }

    fn element_index(&self, element_id: ElementId) -> PlanServiceResult<usize> {
        self.plan
            .elements
            .iter()
            .position(|element| element.id == element_id)
            .ok_or(PlanServiceError::ElementNotFound(element_id))
    }

    fn update_occurrence(
        &mut self,
        id: TaskOccurrenceId,
        apply: impl FnOnce(&mut TaskOccurrence),
    ) -> PlanServiceResult<Decimal> {
        let MaintenancePlan {
            elements, groups, ..
        } = &mut self.plan;
        let task = elements
            .iter_mut()
            .flat_map(|element| element.tasks.iter_mut())
            .find(|task| task.id == id)
            .ok_or(PlanServiceError::TaskNotFound(id))?;

        let mut updated = task.clone();
        apply(&mut updated);
        let group = match updated.group_id {
            Some(group_id) => Some(
                groups
                    .iter()
                    .find(|group| group.id == group_id)
                    .ok_or(EngineError::MissingGroup(group_id))?,
            ),
            None => None,
        };
        updated.resolved_cost = resolve(&updated, group)?;
        let price = updated.resolved_cost;
        *task = updated;
        debug!("event=task_update module=plan status=ok task={id}");
        Ok(price)
    }
}

fn normalize_name(value: String) -> PlanServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PlanServiceError::InvalidName);
    }
    Ok(trimmed.to_string())
}
