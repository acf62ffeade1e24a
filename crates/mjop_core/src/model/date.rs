//! Calendar date parsing and month arithmetic.
//!
//! # Responsibility
//! - Parse user-facing date strings (`YYYY-MM-DD` and `DD-MM-YYYY`).
//! - Provide serde adapters so every model date field accepts both formats.
//! - Compute calendar month offsets and whole-month distances.
//!
//! # Invariants
//! - Dates always serialize as `YYYY-MM-DD`.
//! - Month addition clamps to the last day of a shorter target month.

use crate::engine::{EngineError, EngineResult};
use chrono::{Datelike, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid iso date regex"));
static DUTCH_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{4})$").expect("valid dutch date regex"));

const WIRE_FORMAT: &str = "%Y-%m-%d";

/// Parses a calendar date in `YYYY-MM-DD` or `DD-MM-YYYY` form.
///
/// # Errors
/// - `EngineError::InvalidDate` when the text matches neither format or the
///   day does not exist in that month.
pub fn parse_calendar_date(value: &str) -> EngineResult<NaiveDate> {
    let trimmed = value.trim();
    let (year, month, day) = if let Some(caps) = ISO_DATE_RE.captures(trimmed) {
        (group(&caps, 1), group(&caps, 2), group(&caps, 3))
    } else if let Some(caps) = DUTCH_DATE_RE.captures(trimmed) {
        (group(&caps, 3), group(&caps, 2), group(&caps, 1))
    } else {
        return Err(EngineError::InvalidDate(format!(
            "`{trimmed}` is not YYYY-MM-DD or DD-MM-YYYY"
        )));
    };

    let year: i32 = year
        .parse()
        .map_err(|_| EngineError::InvalidDate(format!("bad year in `{trimmed}`")))?;
    let month: u32 = month
        .parse()
        .map_err(|_| EngineError::InvalidDate(format!("bad month in `{trimmed}`")))?;
    let day: u32 = day
        .parse()
        .map_err(|_| EngineError::InvalidDate(format!("bad day in `{trimmed}`")))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| EngineError::InvalidDate(format!("`{trimmed}` is not a calendar day")))
}

fn group<'h>(caps: &Captures<'h>, index: usize) -> &'h str {
    caps.get(index).map_or("", |m| m.as_str())
}

/// Formats a date in wire format (`YYYY-MM-DD`).
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(WIRE_FORMAT).to_string()
}

/// Adds `months` calendar months to `date`.
///
/// # Errors
/// - `EngineError::InvalidDate` when the result leaves chrono's date range.
pub fn add_months(date: NaiveDate, months: u32) -> EngineResult<NaiveDate> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        EngineError::InvalidDate(format!(
            "{} + {months} months is out of range",
            format_calendar_date(date)
        ))
    })
}

/// Adds `days` calendar days to `date`.
pub fn add_days(date: NaiveDate, days: i64) -> EngineResult<NaiveDate> {
    date.checked_add_signed(chrono::Duration::days(days))
        .ok_or_else(|| {
            EngineError::InvalidDate(format!(
                "{} + {days} days is out of range",
                format_calendar_date(date)
            ))
        })
}

/// Whole months from `from` to `to`.
///
/// A partial trailing month is not counted: when `to.day() < from.day()` one
/// month is subtracted. Returns 0 when `to` is not after `from`.
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut months = (i64::from(to.year()) - i64::from(from.year())) * 12
        + i64::from(to.month()) - i64::from(from.month());
    if to.day() < from.day() {
        months -= 1;
    }
    u32::try_from(months.max(0)).unwrap_or(u32::MAX)
}

/// Serde adapter for required date fields.
pub mod serde_date {
    use super::{format_calendar_date, parse_calendar_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_calendar_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_calendar_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional date fields.
pub mod serde_opt_date {
    use super::{format_calendar_date, parse_calendar_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_some(&format_calendar_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_calendar_date(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}
