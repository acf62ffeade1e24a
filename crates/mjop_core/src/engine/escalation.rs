//! Yearly cost indexation.
//!
//! # Invariants
//! - A zero rate, or disabled indexation, leaves the cost unchanged.
//! - Escalation steps once per newly entered calendar year and compounds on
//!   the running (rounded) price, not on the original base cost.

use crate::engine::{round_money, EngineError, EngineResult};
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

/// Validated yearly indexation rate in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexationRate(Decimal);

impl IndexationRate {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a rate from a percent value (`2.5` means 2.5% a year).
    ///
    /// # Errors
    /// - `EngineError::InvalidRate` when `percent` is negative.
    pub fn new(percent: Decimal) -> EngineResult<Self> {
        if percent < Decimal::ZERO {
            return Err(EngineError::InvalidRate(format!(
                "rate must not be negative, got {percent}%"
            )));
        }
        Ok(Self(percent))
    }

    /// Creates a rate from a floating point percent.
    ///
    /// # Errors
    /// - `EngineError::InvalidRate` for NaN, infinite or negative input.
    pub fn from_f64(percent: f64) -> EngineResult<Self> {
        if !percent.is_finite() {
            return Err(EngineError::InvalidRate(format!(
                "rate must be finite, got {percent}"
            )));
        }
        let value = Decimal::from_f64(percent).ok_or_else(|| {
            EngineError::InvalidRate(format!("rate {percent} is out of decimal range"))
        })?;
        Self::new(value)
    }

    pub fn percent(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

/// Returns `base_cost * (1 + rate/100) ^ elapsed_full_years`, rounded to cents.
///
/// # Errors
/// - `EngineError::InvalidRate` when the compounded factor overflows.
pub fn escalate(
    base_cost: Decimal,
    rate: IndexationRate,
    elapsed_full_years: u32,
) -> EngineResult<Decimal> {
    if rate.is_zero() || elapsed_full_years == 0 {
        return Ok(base_cost);
    }
    let factor = Decimal::ONE + rate.percent() / Decimal::ONE_HUNDRED;
    factor
        .checked_powu(u64::from(elapsed_full_years))
        .and_then(|factor| base_cost.checked_mul(factor))
        .map(round_money)
        .ok_or_else(|| {
            EngineError::InvalidRate(format!(
                "{}% over {elapsed_full_years} years overflows",
                rate.percent()
            ))
        })
}

/// Stepwise escalator carried across the occurrences of one expansion.
///
/// Tracks the last calendar year that was already escalated; each call for a
/// later year escalates the running price by the number of years crossed.
#[derive(Debug, Clone)]
pub struct CostEscalator {
    rate: IndexationRate,
    running_cost: Decimal,
    escalated_year: i32,
}

impl CostEscalator {
    /// Starts escalation at `base_cost` in the calendar year of `anchor`.
    pub fn new(base_cost: Decimal, rate: IndexationRate, anchor: NaiveDate) -> Self {
        Self {
            rate,
            running_cost: base_cost,
            escalated_year: anchor.year(),
        }
    }

    /// Escalator that never changes the cost.
    pub fn disabled(base_cost: Decimal, anchor: NaiveDate) -> Self {
        Self::new(base_cost, IndexationRate::ZERO, anchor)
    }

    /// Returns the escalated cost for an occurrence dated `date`.
    ///
    /// Dates must be presented in non-decreasing order; an earlier year than
    /// the last escalated one returns the running cost unchanged.
    pub fn cost_at(&mut self, date: NaiveDate) -> EngineResult<Decimal> {
        let years_crossed = date.year() - self.escalated_year;
        if years_crossed > 0 {
            let years = u32::try_from(years_crossed).unwrap_or(u32::MAX);
            self.running_cost = escalate(self.running_cost, self.rate, years)?;
            self.escalated_year = date.year();
        }
        Ok(self.running_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::{escalate, CostEscalator, IndexationRate};
    use crate::engine::EngineError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn escalate_compounds_and_rounds() {
        let rate = IndexationRate::new(dec("10")).unwrap();
        assert_eq!(escalate(dec("100"), rate, 1).unwrap(), dec("110"));
        assert_eq!(escalate(dec("100"), rate, 2).unwrap(), dec("121"));
        assert_eq!(
            escalate(dec("99.99"), IndexationRate::new(dec("2.5")).unwrap(), 1).unwrap(),
            dec("102.49")
        );
    }

    #[test]
    fn escalate_is_identity_for_zero_rate_or_zero_years() {
        assert_eq!(
            escalate(dec("123.45"), IndexationRate::ZERO, 7).unwrap(),
            dec("123.45")
        );
        let rate = IndexationRate::new(dec("3")).unwrap();
        assert_eq!(escalate(dec("123.45"), rate, 0).unwrap(), dec("123.45"));
    }

    #[test]
    fn rate_rejects_negative_and_non_finite_values() {
        assert!(matches!(
            IndexationRate::new(dec("-0.5")),
            Err(EngineError::InvalidRate(_))
        ));
        assert!(matches!(
            IndexationRate::from_f64(f64::NAN),
            Err(EngineError::InvalidRate(_))
        ));
        assert!(matches!(
            IndexationRate::from_f64(f64::INFINITY),
            Err(EngineError::InvalidRate(_))
        ));
        assert_eq!(
            IndexationRate::from_f64(2.5).unwrap().percent(),
            dec("2.5")
        );
    }

    #[test]
    fn escalator_steps_once_per_calendar_year() {
        let rate = IndexationRate::new(dec("10")).unwrap();
        let mut escalator = CostEscalator::new(dec("100"), rate, ymd(2024, 6, 1));

        assert_eq!(escalator.cost_at(ymd(2024, 6, 1)).unwrap(), dec("100"));
        assert_eq!(escalator.cost_at(ymd(2024, 11, 1)).unwrap(), dec("100"));
        assert_eq!(escalator.cost_at(ymd(2025, 3, 1)).unwrap(), dec("110"));
        assert_eq!(escalator.cost_at(ymd(2025, 9, 1)).unwrap(), dec("110"));
        assert_eq!(escalator.cost_at(ymd(2027, 1, 1)).unwrap(), dec("133.1"));
    }
}
