//! Task template and task occurrence model.
//!
//! # Responsibility
//! - Define the template a planner fills in for one maintenance task.
//! - Define the concrete, dated occurrence generated from a template.
//! - Define the schedule shape (one-off vs recurring) and its settings.
//!
//! # Invariants
//! - `urgency` is within `1..=5`.
//! - Money fields are never negative after `validate()`.
//! - `end_date >= start_date` whenever both are set.

use crate::engine::{ensure_non_negative, EngineError, EngineResult};
use crate::model::date::{serde_date, serde_opt_date};
use crate::model::group::TaskGroupId;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Stable identifier for one generated task occurrence.
pub type TaskOccurrenceId = Uuid;

/// Urgency rating from 1 (can wait) to 5 (immediate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Urgency(u8);

impl Urgency {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Creates a validated urgency.
    pub fn new(value: u8) -> EngineResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(EngineError::InvalidUrgency(value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Self(3)
    }
}

impl<'de> Deserialize<'de> for Urgency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        Urgency::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Planner input describing one maintenance task before expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub urgency: Urgency,
    /// Estimated cost at today's prices.
    pub base_cost: Decimal,
    /// Due date (a.k.a. ultimate date) of the first occurrence.
    #[serde(with = "serde_date")]
    pub due_date: NaiveDate,
    /// Planned start of work; only used when an offer window is needed.
    #[serde(default, with = "serde_opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub duration_days: u32,
    /// Whether work waits on an accepted contractor offer.
    #[serde(default)]
    pub offer_needed: bool,
}

impl TaskTemplate {
    /// Creates a template with default urgency and no offer window.
    pub fn new(name: impl Into<String>, base_cost: Decimal, due_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            urgency: Urgency::default(),
            base_cost,
            due_date,
            start_date: None,
            duration_days: 0,
            offer_needed: false,
        }
    }

    /// Validates money fields.
    pub fn validate(&self) -> EngineResult<()> {
        ensure_non_negative("base_cost", self.base_cost)
    }
}

/// Recurrence period in one of the two units planners use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePeriod {
    /// Every `n` calendar months.
    Months(u32),
    /// Every `n` years; must resolve to a whole number of months.
    Years(Decimal),
}

impl RecurrencePeriod {
    /// Returns the period length in calendar months.
    ///
    /// # Errors
    /// - `EngineError::InvalidRecurrence` when the period is not positive or
    ///   is not a whole number of months.
    pub fn months(&self) -> EngineResult<u32> {
        match *self {
            Self::Months(0) => Err(EngineError::InvalidRecurrence(
                "periodicity must be greater than 0 months".to_string(),
            )),
            Self::Months(months) => Ok(months),
            Self::Years(years) => {
                if years <= Decimal::ZERO {
                    return Err(EngineError::InvalidRecurrence(format!(
                        "interval must be greater than 0 years, got {years}"
                    )));
                }
                let months = years.checked_mul(Decimal::from(12)).ok_or_else(|| {
                    EngineError::InvalidRecurrence(format!("interval {years} years overflows"))
                })?;
                if !months.fract().is_zero() {
                    return Err(EngineError::InvalidRecurrence(format!(
                        "interval {years} years is not a whole number of months"
                    )));
                }
                months.to_u32().ok_or_else(|| {
                    EngineError::InvalidRecurrence(format!("interval {years} years is too large"))
                })
            }
        }
    }
}

/// Settings for a recurring task expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceSettings {
    pub period: RecurrencePeriod,
    /// Projection horizon in years.
    pub total_years: Decimal,
    #[serde(default)]
    pub indexation_enabled: bool,
    /// Yearly indexation in percent (`2.5` means 2.5%).
    #[serde(default)]
    pub indexation_rate_percent: Decimal,
    /// Contract cost spread evenly across all generated occurrences.
    #[serde(default)]
    pub contract_cost: Option<Decimal>,
}

impl RecurrenceSettings {
    /// Creates settings without indexation or contract cost.
    pub fn new(period: RecurrencePeriod, total_years: Decimal) -> Self {
        Self {
            period,
            total_years,
            indexation_enabled: false,
            indexation_rate_percent: Decimal::ZERO,
            contract_cost: None,
        }
    }

    /// Enables yearly indexation at `rate_percent`.
    pub fn with_indexation(mut self, rate_percent: Decimal) -> Self {
        self.indexation_enabled = true;
        self.indexation_rate_percent = rate_percent;
        self
    }

    /// Sets the contract cost divided across the expansion.
    pub fn with_contract_cost(mut self, contract_cost: Decimal) -> Self {
        self.contract_cost = Some(contract_cost);
        self
    }
}

/// How a template turns into occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskSchedule {
    /// Exactly one occurrence from the template's own dates.
    Once,
    /// Periodic expansion over a horizon.
    Recurring(RecurrenceSettings),
}

/// One concrete, dated task generated from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOccurrence {
    pub id: TaskOccurrenceId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(with = "serde_date")]
    pub due_date: NaiveDate,
    #[serde(default, with = "serde_opt_date")]
    pub planned_work_date: Option<NaiveDate>,
    #[serde(default, with = "serde_opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "serde_opt_date")]
    pub end_date: Option<NaiveDate>,
    /// Escalated template cost plus any contract share.
    #[serde(default)]
    pub estimated_cost: Option<Decimal>,
    #[serde(default)]
    pub offer_price: Option<Decimal>,
    #[serde(default)]
    pub invoice_price: Option<Decimal>,
    /// Effective price after resolution; what the budget projection debits.
    #[serde(default)]
    pub resolved_cost: Decimal,
    #[serde(default)]
    pub offer_needed: bool,
    #[serde(default)]
    pub offer_accepted: bool,
    #[serde(default)]
    pub group_id: Option<TaskGroupId>,
}

impl TaskOccurrence {
    /// Creates an occurrence from `template` with a fresh ID.
    ///
    /// Dates and costs are set by the caller; `resolved_cost` starts at the
    /// estimate.
    pub fn from_template(template: &TaskTemplate, due_date: NaiveDate, estimate: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: template.name.clone(),
            description: template.description.clone(),
            urgency: template.urgency,
            due_date,
            planned_work_date: None,
            start_date: None,
            end_date: None,
            estimated_cost: Some(estimate),
            offer_price: None,
            invoice_price: None,
            resolved_cost: estimate,
            offer_needed: template.offer_needed,
            offer_accepted: false,
            group_id: None,
        }
    }

    /// Validates money fields and the work window.
    pub fn validate(&self) -> EngineResult<()> {
        for (field, value) in [
            ("estimated_cost", self.estimated_cost),
            ("offer_price", self.offer_price),
            ("invoice_price", self.invoice_price),
        ] {
            if let Some(value) = value {
                ensure_non_negative(field, value)?;
            }
        }
        ensure_non_negative("resolved_cost", self.resolved_cost)?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(EngineError::InvalidDate(format!(
                    "end_date {end} is before start_date {start}"
                )));
            }
        }
        Ok(())
    }

    /// Returns whether this occurrence is linked to an offer group.
    pub fn is_grouped(&self) -> bool {
        self.group_id.is_some()
    }
}
