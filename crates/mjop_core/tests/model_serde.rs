use chrono::NaiveDate;
use mjop_core::{
    BudgetEvent, CashInfo, RecurrencePeriod, RecurrenceSettings, TaskOccurrence, TaskSchedule,
    TaskTemplate, Urgency,
};
use rust_decimal_macros::dec;
use serde_json::json;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn template_accepts_both_date_formats_and_defaults() {
    let template: TaskTemplate = serde_json::from_value(json!({
        "name": "Hemelwaterafvoer",
        "base_cost": "125.50",
        "due_date": "15-03-2025",
        "start_date": "2025-02-01",
        "duration_days": 7,
        "offer_needed": true
    }))
    .unwrap();

    assert_eq!(template.due_date, ymd(2025, 3, 15));
    assert_eq!(template.start_date, Some(ymd(2025, 2, 1)));
    assert_eq!(template.base_cost, dec!(125.50));
    assert_eq!(template.urgency, Urgency::default());
    assert_eq!(template.description, "");
}

#[test]
fn blank_optional_date_reads_as_unset() {
    let template: TaskTemplate = serde_json::from_value(json!({
        "name": "Dakrand",
        "base_cost": 10,
        "due_date": "2025-01-01",
        "start_date": ""
    }))
    .unwrap();
    assert_eq!(template.start_date, None);
}

#[test]
fn invalid_dates_and_urgency_are_rejected() {
    let bad_date = serde_json::from_value::<TaskTemplate>(json!({
        "name": "Dakrand",
        "base_cost": 10,
        "due_date": "2025-02-30"
    }));
    assert!(bad_date.is_err());

    let bad_urgency = serde_json::from_value::<TaskTemplate>(json!({
        "name": "Dakrand",
        "base_cost": 10,
        "due_date": "2025-02-01",
        "urgency": 6
    }));
    assert!(bad_urgency.is_err());
}

#[test]
fn schedule_is_tagged_by_kind() {
    let recurring: TaskSchedule = serde_json::from_value(json!({
        "kind": "recurring",
        "period": { "months": 12 },
        "total_years": "10",
        "indexation_enabled": true,
        "indexation_rate_percent": 2.5
    }))
    .unwrap();
    assert_eq!(
        recurring,
        TaskSchedule::Recurring(
            RecurrenceSettings::new(RecurrencePeriod::Months(12), dec!(10))
                .with_indexation(dec!(2.5))
        )
    );

    let yearly: TaskSchedule = serde_json::from_value(json!({
        "kind": "recurring",
        "period": { "years": "1.5" },
        "total_years": 30
    }))
    .unwrap();
    assert_eq!(
        yearly,
        TaskSchedule::Recurring(RecurrenceSettings::new(
            RecurrencePeriod::Years(dec!(1.5)),
            dec!(30)
        ))
    );

    let once: TaskSchedule = serde_json::from_value(json!({ "kind": "once" })).unwrap();
    assert_eq!(once, TaskSchedule::Once);
    assert_eq!(serde_json::to_value(&once).unwrap(), json!({ "kind": "once" }));
}

#[test]
fn occurrence_serializes_dates_iso_and_money_as_strings() {
    let template = TaskTemplate::new("Goten", dec!(99.90), ymd(2025, 6, 1));
    let mut task = TaskOccurrence::from_template(&template, ymd(2025, 6, 1), dec!(99.90));
    task.offer_price = Some(dec!(0));

    let value = serde_json::to_value(&task).unwrap();
    assert_eq!(value["due_date"], json!("2025-06-01"));
    assert_eq!(value["start_date"], json!(null));
    assert_eq!(value["estimated_cost"], json!("99.90"));
    assert_eq!(value["offer_price"], json!("0"));
    assert_eq!(value["invoice_price"], json!(null));
    assert_eq!(value["urgency"], json!(3));
    assert_eq!(value["group_id"], json!(null));

    let back: TaskOccurrence = serde_json::from_value(value).unwrap();
    assert_eq!(back, task);
}

#[test]
fn cash_and_events_use_snake_case_fields() {
    let cash: CashInfo = serde_json::from_value(json!({
        "current_cash": "-150.00",
        "monthly_contribution": "75",
        "reserve_date": "01-07-2024"
    }))
    .unwrap();
    assert_eq!(cash, CashInfo::new(dec!(-150), dec!(75), ymd(2024, 7, 1)));
    cash.validate().unwrap();

    let event: BudgetEvent = serde_json::from_value(json!({ "price": "12.5" })).unwrap();
    assert_eq!(event, BudgetEvent::undated(dec!(12.5)));
}
