//! Core scheduling and reserve-fund projection for multi-year maintenance
//! plans (MJOP).
//! This crate is the single source of truth for the plan's numeric and
//! temporal invariants.

pub mod engine;
pub mod logging;
pub mod model;
pub mod service;

pub use engine::escalation::{escalate, CostEscalator, IndexationRate};
pub use engine::grouping::{create_group, delete_group, edit_group, unlink_group};
pub use engine::pricing::{explain, resolve, resolve_all, PriceSource, ResolvedPrice};
pub use engine::projection::{project, sort_events};
pub use engine::recurrence::{expand, occurrence_count};
pub use engine::{round_money, EngineError, EngineResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::cash::{BudgetEvent, CashInfo};
pub use model::date::{format_calendar_date, parse_calendar_date};
pub use model::group::{GroupMember, GroupSettings, TaskGroup, TaskGroupId};
pub use model::plan::{
    Element, ElementId, ElementRequest, GroupMemberRef, GroupRequest, MaintenancePlan,
    PlanDocument, TaskRequest,
};
pub use model::task::{
    RecurrencePeriod, RecurrenceSettings, TaskOccurrence, TaskOccurrenceId, TaskSchedule,
    TaskTemplate, Urgency,
};
pub use service::plan_service::{PlanService, PlanServiceError, PlanServiceResult, TaskBalance};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
