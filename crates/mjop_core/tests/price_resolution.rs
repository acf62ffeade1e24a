use chrono::NaiveDate;
use mjop_core::{
    explain, resolve, resolve_all, EngineError, GroupMember, PriceSource, TaskGroup,
    TaskOccurrence, TaskTemplate,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn occurrence(estimate: Decimal) -> TaskOccurrence {
    let template = TaskTemplate::new("Dakbedekking vervangen", estimate, ymd(2025, 5, 1));
    TaskOccurrence::from_template(&template, ymd(2025, 5, 1), estimate)
}

fn group_of(members: &mut [&mut TaskOccurrence], cost: Option<Decimal>) -> TaskGroup {
    let group = TaskGroup {
        id: Uuid::new_v4(),
        name: "Offerte dakdekker".to_string(),
        group_date: ymd(2025, 5, 1),
        cost,
        assign_prices_individually: false,
        members: members
            .iter()
            .map(|task| GroupMember {
                occurrence_id: task.id,
                individual_cost: None,
            })
            .collect(),
    };
    for task in members.iter_mut() {
        task.group_id = Some(group.id);
    }
    group
}

#[test]
fn estimate_is_used_when_nothing_else_is_set() {
    let task = occurrence(dec!(640));
    let resolved = explain(&task, None).unwrap();
    assert_eq!(resolved.amount, dec!(640));
    assert_eq!(resolved.source, PriceSource::Estimate);
}

#[test]
fn invoice_beats_offer_beats_estimate() {
    let mut task = occurrence(dec!(640));
    task.offer_price = Some(dec!(700));
    assert_eq!(resolve(&task, None).unwrap(), dec!(700));

    task.invoice_price = Some(dec!(715.40));
    let resolved = explain(&task, None).unwrap();
    assert_eq!(resolved.amount, dec!(715.40));
    assert_eq!(resolved.source, PriceSource::Invoice);
}

#[test]
fn explicit_zero_is_distinguished_from_unset() {
    let mut task = occurrence(dec!(640));
    task.offer_price = Some(dec!(500));
    task.invoice_price = Some(dec!(0));
    let resolved = explain(&task, None).unwrap();
    assert_eq!(resolved.amount, dec!(0));
    assert_eq!(resolved.source, PriceSource::Invoice);
}

#[test]
fn unpriced_occurrence_resolves_to_zero() {
    let mut task = occurrence(dec!(0));
    task.estimated_cost = None;
    let resolved = explain(&task, None).unwrap();
    assert_eq!(resolved.amount, dec!(0));
    assert_eq!(resolved.source, PriceSource::Unpriced);
}

#[test]
fn joint_group_price_is_shared_evenly_and_wins() {
    let mut first = occurrence(dec!(100));
    let mut second = occurrence(dec!(100));
    let mut third = occurrence(dec!(100));
    first.invoice_price = Some(dec!(999));
    let group = group_of(&mut [&mut first, &mut second, &mut third], Some(dec!(1000)));

    let resolved = explain(&first, Some(&group)).unwrap();
    assert_eq!(resolved.amount, dec!(333.33));
    assert_eq!(resolved.source, PriceSource::GroupShare);
    assert_eq!(resolve(&second, Some(&group)).unwrap(), dec!(333.33));
    assert_eq!(resolve(&third, Some(&group)).unwrap(), dec!(333.34));
}

#[test]
fn joint_shares_add_up_to_group_cost() {
    let mut first = occurrence(dec!(0));
    let mut second = occurrence(dec!(0));
    let mut third = occurrence(dec!(0));
    let group = group_of(&mut [&mut first, &mut second, &mut third], Some(dec!(100)));

    let prices = resolve_all([&first, &second, &third], std::slice::from_ref(&group)).unwrap();
    assert_eq!(prices, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
    assert_eq!(prices.iter().sum::<Decimal>(), dec!(100));

    let mut members: Vec<_> = (0..10).map(|_| occurrence(dec!(0))).collect();
    let mut refs: Vec<&mut TaskOccurrence> = members.iter_mut().collect();
    let small = group_of(&mut refs, Some(dec!(0.05)));
    let prices = resolve_all(members.iter(), std::slice::from_ref(&small)).unwrap();
    assert!(prices.iter().all(|price| *price >= dec!(0)));
    assert_eq!(prices.iter().sum::<Decimal>(), dec!(0.05));
}

#[test]
fn group_without_cost_falls_through_to_own_prices() {
    let mut first = occurrence(dec!(100));
    let mut second = occurrence(dec!(200));
    first.offer_price = Some(dec!(150));
    let group = group_of(&mut [&mut first, &mut second], None);

    assert_eq!(resolve(&first, Some(&group)).unwrap(), dec!(150));
    assert_eq!(resolve(&second, Some(&group)).unwrap(), dec!(200));
}

#[test]
fn individual_prices_use_override_then_own_chain() {
    let mut first = occurrence(dec!(100));
    let mut second = occurrence(dec!(100));
    second.invoice_price = Some(dec!(180));
    let mut group = group_of(&mut [&mut first, &mut second], Some(dec!(5000)));
    group.assign_prices_individually = true;
    group.members[0].individual_cost = Some(dec!(120));

    let resolved = explain(&first, Some(&group)).unwrap();
    assert_eq!(resolved.amount, dec!(120));
    assert_eq!(resolved.source, PriceSource::IndividualCost);

    let resolved = explain(&second, Some(&group)).unwrap();
    assert_eq!(resolved.amount, dec!(180));
    assert_eq!(resolved.source, PriceSource::Invoice);
}

#[test]
fn unresolvable_group_reference_is_reported() {
    let mut first = occurrence(dec!(100));
    let group = group_of(&mut [&mut first], Some(dec!(100)));

    assert_eq!(
        resolve(&first, None).unwrap_err(),
        EngineError::MissingGroup(group.id)
    );

    let mut other_member = occurrence(dec!(100));
    let other = group_of(&mut [&mut other_member], Some(dec!(100)));
    assert_eq!(
        resolve(&first, Some(&other)).unwrap_err(),
        EngineError::MissingGroup(group.id)
    );

    let err = resolve_all([&first, &other_member], std::slice::from_ref(&other)).unwrap_err();
    assert_eq!(err, EngineError::MissingGroup(group.id));
}

#[test]
fn resolve_all_keeps_input_order() {
    let mut first = occurrence(dec!(10));
    let second = occurrence(dec!(20));
    let mut third = occurrence(dec!(30));
    third.offer_price = Some(dec!(35));
    let group = group_of(&mut [&mut first], Some(dec!(12)));

    let prices = resolve_all([&first, &second, &third], &[group]).unwrap();
    assert_eq!(prices, vec![dec!(12), dec!(20), dec!(35)]);
}

#[test]
fn negative_winning_price_is_rejected() {
    let mut task = occurrence(dec!(100));
    task.offer_price = Some(dec!(-5));
    assert!(matches!(
        resolve(&task, None).unwrap_err(),
        EngineError::InvalidAmount { field: "price", .. }
    ));
}
