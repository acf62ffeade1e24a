//! Reserve fund inputs for the budget projection.

use crate::engine::{ensure_non_negative, EngineResult};
use crate::model::date::{serde_date, serde_opt_date};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reserve fund state as entered on the financial settings screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashInfo {
    pub current_cash: Decimal,
    pub monthly_contribution: Decimal,
    /// Date from which monthly contributions accrue.
    #[serde(with = "serde_date")]
    pub reserve_date: NaiveDate,
}

impl CashInfo {
    pub fn new(
        current_cash: Decimal,
        monthly_contribution: Decimal,
        reserve_date: NaiveDate,
    ) -> Self {
        Self {
            current_cash,
            monthly_contribution,
            reserve_date,
        }
    }

    /// `current_cash` may be negative (an overdrawn fund); the contribution may not.
    pub fn validate(&self) -> EngineResult<()> {
        ensure_non_negative("monthly_contribution", self.monthly_contribution)
    }
}

/// One priced, optionally dated debit fed to the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetEvent {
    #[serde(default, with = "serde_opt_date")]
    pub date: Option<NaiveDate>,
    pub price: Decimal,
}

impl BudgetEvent {
    pub fn dated(date: NaiveDate, price: Decimal) -> Self {
        Self {
            date: Some(date),
            price,
        }
    }

    pub fn undated(price: Decimal) -> Self {
        Self { date: None, price }
    }
}
