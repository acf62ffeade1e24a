use chrono::NaiveDate;
use mjop_core::{project, sort_events, BudgetEvent, CashInfo, EngineError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn reserve() -> CashInfo {
    CashInfo::new(dec!(1000), dec!(100), ymd(2024, 1, 1))
}

#[test]
fn single_future_event_accrues_whole_months_then_debits() {
    let events = [BudgetEvent::dated(ymd(2024, 4, 1), dec!(250))];
    let balances = project(&reserve(), &events, ymd(2024, 1, 1)).unwrap();
    assert_eq!(balances, vec![dec!(1050)]);
}

#[test]
fn each_event_accrues_only_since_the_previous_event() {
    let events = [
        BudgetEvent::dated(ymd(2024, 4, 1), dec!(250)),
        BudgetEvent::dated(ymd(2024, 7, 1), dec!(500)),
        BudgetEvent::dated(ymd(2024, 7, 15), dec!(100)),
    ];
    let balances = project(&reserve(), &events, ymd(2024, 1, 1)).unwrap();
    assert_eq!(balances, vec![dec!(1050), dec!(850), dec!(750)]);
}

#[test]
fn partial_month_is_not_credited() {
    let cash = CashInfo::new(dec!(0), dec!(100), ymd(2024, 1, 15));
    let events = [BudgetEvent::dated(ymd(2024, 4, 14), dec!(0))];
    let balances = project(&cash, &events, ymd(2024, 1, 1)).unwrap();
    assert_eq!(balances, vec![dec!(200)]);
}

#[test]
fn balance_is_clamped_at_zero_and_recovers_from_zero() {
    let cash = CashInfo::new(dec!(100), dec!(50), ymd(2024, 1, 1));
    let events = [
        BudgetEvent::dated(ymd(2024, 2, 1), dec!(1000)),
        BudgetEvent::dated(ymd(2024, 5, 1), dec!(0)),
    ];
    let balances = project(&cash, &events, ymd(2024, 1, 1)).unwrap();
    assert_eq!(balances, vec![dec!(0), dec!(150)]);
    assert!(balances.iter().all(|balance| *balance >= dec!(0)));
}

#[test]
fn past_events_debit_without_accrual_or_re_anchoring() {
    let events = [
        BudgetEvent::dated(ymd(2024, 3, 1), dec!(200)),
        BudgetEvent::dated(ymd(2024, 9, 1), dec!(100)),
    ];
    let balances = project(&reserve(), &events, ymd(2024, 6, 1)).unwrap();
    // 1000 - 200, then 8 months since the reserve date: 800 + 800 - 100.
    assert_eq!(balances, vec![dec!(800), dec!(1500)]);
}

#[test]
fn event_on_today_counts_as_future() {
    let events = [BudgetEvent::dated(ymd(2024, 3, 1), dec!(0))];
    let balances = project(&reserve(), &events, ymd(2024, 3, 1)).unwrap();
    assert_eq!(balances, vec![dec!(1200)]);
}

#[test]
fn undated_events_repeat_prior_balance() {
    let events = [
        BudgetEvent::undated(dec!(999)),
        BudgetEvent::dated(ymd(2024, 4, 1), dec!(250)),
        BudgetEvent::undated(dec!(999)),
        BudgetEvent::dated(ymd(2024, 5, 1), dec!(50)),
    ];
    let balances = project(&reserve(), &events, ymd(2024, 1, 1)).unwrap();
    assert_eq!(balances.len(), events.len());
    assert_eq!(
        balances,
        vec![dec!(1000), dec!(1050), dec!(1050), dec!(1100)]
    );
}

#[test]
fn empty_input_yields_empty_output() {
    assert!(project(&reserve(), &[], ymd(2024, 1, 1)).unwrap().is_empty());
}

#[test]
fn projection_is_deterministic() {
    let events = [
        BudgetEvent::dated(ymd(2024, 2, 10), dec!(75.25)),
        BudgetEvent::dated(ymd(2025, 6, 30), dec!(1234.56)),
        BudgetEvent::dated(ymd(2031, 1, 1), dec!(9000)),
    ];
    let first = project(&reserve(), &events, ymd(2024, 1, 1)).unwrap();
    let second = project(&reserve(), &events, ymd(2024, 1, 1)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unsorted_dated_events_are_rejected() {
    let events = [
        BudgetEvent::dated(ymd(2024, 6, 1), dec!(10)),
        BudgetEvent::undated(dec!(10)),
        BudgetEvent::dated(ymd(2024, 5, 1), dec!(10)),
    ];
    let err = project(&reserve(), &events, ymd(2024, 1, 1)).unwrap_err();
    assert_eq!(err, EngineError::UnsortedEvents { index: 2 });
}

#[test]
fn negative_inputs_are_rejected() {
    let events = [BudgetEvent::dated(ymd(2024, 6, 1), dec!(-10))];
    let err = project(&reserve(), &events, ymd(2024, 1, 1)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount { field: "price", .. }));

    let cash = CashInfo::new(dec!(1000), dec!(-1), ymd(2024, 1, 1));
    let err = project(&cash, &[], ymd(2024, 1, 1)).unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidAmount {
            field: "monthly_contribution",
            ..
        }
    ));
}

#[test]
fn sort_events_orders_by_date_with_undated_last() {
    let mut events = vec![
        BudgetEvent::undated(dec!(1)),
        BudgetEvent::dated(ymd(2025, 1, 1), dec!(2)),
        BudgetEvent::dated(ymd(2024, 1, 1), dec!(3)),
        BudgetEvent::dated(ymd(2025, 1, 1), dec!(4)),
    ];
    sort_events(&mut events);

    let prices: Vec<_> = events.iter().map(|event| event.price).collect();
    assert_eq!(prices, vec![dec!(3), dec!(2), dec!(4), dec!(1)]);
    project(&reserve(), &events, ymd(2024, 1, 1)).unwrap();
}

#[test]
fn balance_overflow_is_an_error() {
    let contribution = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
    let cash = CashInfo::new(dec!(0), contribution, ymd(2024, 1, 1));
    let events = [BudgetEvent::dated(ymd(2124, 1, 1), dec!(1))];

    let err = project(&cash, &events, ymd(2024, 1, 1)).unwrap_err();
    assert_eq!(err, EngineError::AmountOverflow { field: "balance" });
}
